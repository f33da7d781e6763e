//! Monthly series that are never revised (treasury and bond yields).
//!
//! Without vintages the real-time value is just the quarterly mean of the
//! monthly observations.

use super::{PeriodSeries, QueryKind, RealTimeSeries};
use crate::{Horizon, Result, period::Period};
use std::collections::BTreeMap;

/// Real-time series for monthly-normal (`MN`) variables.
#[derive(Debug, Clone)]
pub struct RealMonthlyNormal {
    quarterly: BTreeMap<Period, f64>,
    horizon: Horizon,
}

impl RealMonthlyNormal {
    /// Aggregate monthly observations into quarterly means.
    ///
    /// NaN observations are skipped; a quarter with none left is absent.
    pub fn new(observations: Vec<(Period, f64)>, horizon: Horizon) -> Result<Self> {
        let mut sums: BTreeMap<Period, (f64, usize)> = BTreeMap::new();
        for (period, value) in observations.into_iter().filter(|(_, v)| !v.is_nan()) {
            let entry = sums.entry(period.to_quarter()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        let quarterly = sums
            .into_iter()
            .map(|(quarter, (sum, count))| (quarter, sum / count as f64))
            .collect();
        Ok(Self { quarterly, horizon })
    }

    /// Quarterly mean at `t`, NaN if absent.
    pub fn mean(&self, t: Period) -> f64 {
        self.quarterly
            .get(&t.to_quarter())
            .copied()
            .unwrap_or(f64::NAN)
    }
}

impl RealTimeSeries for RealMonthlyNormal {
    fn query(&self, period: Period, kind: QueryKind) -> Result<f64> {
        let t = period.to_quarter();
        Ok(match kind {
            QueryKind::Level => self.mean(t),
            QueryKind::Growth => self.mean(t) / self.mean(t.add(-self.horizon.offset())) - 1.0,
            QueryKind::NextLevel => self.mean(t.add(1)),
        })
    }

    fn last_level(&self) -> Result<PeriodSeries> {
        Ok(self
            .quarterly
            .iter()
            .map(|(quarter, value)| (quarter.add(1), *value))
            .collect())
    }

    fn actual_growth(&self) -> Result<PeriodSeries> {
        let h = self.horizon.offset();
        Ok(self
            .quarterly
            .keys()
            .map(|quarter| {
                let t = quarter.add(-(h - 1));
                (t, self.mean(*quarter) / self.mean(t.add(-1)) - 1.0)
            })
            .collect())
    }

    fn actual_level(&self) -> Result<PeriodSeries> {
        let h = self.horizon.offset();
        Ok(self
            .quarterly
            .iter()
            .map(|(quarter, value)| (quarter.add(-(h - 1)), *value))
            .collect())
    }

    fn horizon(&self) -> Horizon {
        self.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn fixture() -> RealMonthlyNormal {
        let start = p("2000-01");
        let observations = (0..24).map(|i| (start.add(i), 1.0 + f64::from(i / 3))).collect();
        RealMonthlyNormal::new(observations, Horizon::default()).unwrap()
    }

    #[test]
    fn test_quarterly_mean() {
        let start = p("2000-01");
        let real = RealMonthlyNormal::new(
            vec![(start, 1.0), (start.add(1), 2.0), (start.add(2), f64::NAN)],
            Horizon::default(),
        )
        .unwrap();
        assert_relative_eq!(real.query(p("2000Q1"), QueryKind::Level).unwrap(), 1.5);
        assert!(real.query(p("2000Q2"), QueryKind::Level).unwrap().is_nan());
    }

    #[test]
    fn test_actual_level_shifted_back() {
        let real = fixture();
        let level = real.actual_level().unwrap();
        // Quarter k has mean 1 + k; x_{t+3} restated at t.
        assert_relative_eq!(level.get(p("2000Q1")).unwrap(), 4.0);
        assert_eq!(level.len(), 8);
        assert_eq!(level.first_period(), Some(p("1999Q2")));
    }

    #[test]
    fn test_last_level_and_growth() {
        let real = fixture();
        let last = real.last_level().unwrap();
        assert_relative_eq!(last.get(p("2000Q2")).unwrap(), 1.0);

        let growth = real.actual_growth().unwrap();
        // x_{2000Q4} / x_{1999Q4}: base missing.
        assert_eq!(growth.get(p("2000Q1")), None);
        // x_{2001Q1} / x_{2000Q1} = 5 / 1.
        assert_relative_eq!(growth.get(p("2000Q2")).unwrap(), 4.0);
        assert_relative_eq!(
            real.query(p("2001Q1"), QueryKind::Growth).unwrap(),
            4.0
        );
        assert_relative_eq!(real.query(p("2000Q1"), QueryKind::NextLevel).unwrap(), 2.0);
    }
}
