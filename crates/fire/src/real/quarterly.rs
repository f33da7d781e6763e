//! Quarterly observations with quarterly vintages (national accounts).
//!
//! The level of quarter `t` is read from the release of quarter `t+1`, the
//! first release that can contain it. Growth compares that release's level
//! of `t` with its level of `t-h`.

use super::{PeriodSeries, QueryKind, RealTimeSeries, VintageMatrix};
use crate::{
    FireError, Horizon, Result,
    period::{Frequency, Period},
};
use std::collections::BTreeSet;

/// Real-time series for quarterly (`Q`) variables.
#[derive(Debug, Clone)]
pub struct RealQuarterly {
    matrix: VintageMatrix,
    horizon: Horizon,
}

impl RealQuarterly {
    /// Wrap a quarterly × quarterly vintage matrix.
    pub fn new(matrix: VintageMatrix, horizon: Horizon) -> Result<Self> {
        let quarterly = |labels: &[Period]| {
            labels.iter().all(|p| p.frequency() == Frequency::Quarterly)
        };
        if !quarterly(matrix.observations()) || !quarterly(matrix.vintages()) {
            return Err(FireError::InvalidFrequency(
                "quarterly series needs quarterly observations and vintages".to_string(),
            ));
        }
        Ok(Self { matrix, horizon })
    }

    /// The wrapped vintage matrix.
    pub const fn matrix(&self) -> &VintageMatrix {
        &self.matrix
    }

    /// Realised values restated at `v - h` for every vintage `v`.
    fn actual(&self, kind: QueryKind) -> Result<PeriodSeries> {
        let h = self.horizon.offset();
        self.matrix
            .vintages()
            .iter()
            .map(|v| {
                let t = v.add(-h);
                Ok((t, self.query(t.add(h - 1), kind)?))
            })
            .collect()
    }
}

impl RealTimeSeries for RealQuarterly {
    fn query(&self, period: Period, kind: QueryKind) -> Result<f64> {
        let t = period.to_quarter();
        let vintage = t.add(1);
        match kind {
            QueryKind::Level => Ok(self.matrix.get(t, vintage)),
            QueryKind::Growth => {
                let base = self.matrix.get(t.add(-self.horizon.offset()), vintage);
                Ok(self.matrix.get(t, vintage) / base - 1.0)
            }
            QueryKind::NextLevel => Err(FireError::InvalidKind(kind.to_string())),
        }
    }

    fn last_level(&self) -> Result<PeriodSeries> {
        let vintages: BTreeSet<Period> = self.matrix.vintages().iter().copied().collect();
        let mut common = self
            .matrix
            .observations()
            .iter()
            .copied()
            .filter(|p| vintages.contains(p));

        // The earliest common quarter has no earlier level to report.
        common.next();
        common
            .map(|t| Ok((t, self.query(t.add(-1), QueryKind::Level)?)))
            .collect()
    }

    fn actual_growth(&self) -> Result<PeriodSeries> {
        self.actual(QueryKind::Growth)
    }

    fn actual_level(&self) -> Result<PeriodSeries> {
        self.actual(QueryKind::Level)
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

    /// Observation `i` first released at `i+1` with value `100 + i`, revised
    /// up by 0.5 in every later release.
    fn fixture(n: i32, horizon: usize) -> RealQuarterly {
        let start = p("2000Q1");
        let observations: Vec<Period> = (0..n).map(|i| start.add(i)).collect();
        let vintages: Vec<Period> = (1..=n).map(|i| start.add(i)).collect();
        let cells = (0..n).flat_map(|i| {
            (i + 1..=n).map(move |v| {
                let revisions = f64::from(v - i - 1);
                (start.add(i), start.add(v), 100.0 + f64::from(i) + 0.5 * revisions)
            })
        });
        let matrix = VintageMatrix::from_cells(observations, vintages, cells).unwrap();
        RealQuarterly::new(matrix, Horizon::new(horizon).unwrap()).unwrap()
    }

    #[test]
    fn test_level_reads_first_release() {
        let real = fixture(12, 4);
        assert_relative_eq!(real.query(p("2000Q3"), QueryKind::Level).unwrap(), 102.0);
        assert!(real.query(p("2003Q4"), QueryKind::Level).unwrap().is_nan());
    }

    #[test]
    fn test_growth_matches_level_ratio() {
        let real = fixture(12, 4);
        for i in 4..11 {
            let t = p("2000Q1").add(i);
            let vintage = t.add(1);
            let expected = real.matrix().get(t, vintage) / real.matrix().get(t.add(-4), vintage) - 1.0;
            assert_relative_eq!(
                real.query(t, QueryKind::Growth).unwrap(),
                expected,
                epsilon = 1e-12
            );
        }
        assert!(real.query(p("2000Q2"), QueryKind::Growth).unwrap().is_nan());
    }

    #[test]
    fn test_next_level_unsupported() {
        let real = fixture(4, 4);
        assert!(matches!(
            real.query(p("2000Q2"), QueryKind::NextLevel),
            Err(FireError::InvalidKind(_))
        ));
    }

    #[test]
    fn test_last_level_has_no_look_ahead() {
        let real = fixture(12, 4);
        let last = real.last_level().unwrap();
        assert!(!last.is_empty());
        for (t, value) in last.iter() {
            // Value of t-1 as first released at t, never a later revision.
            assert_relative_eq!(value, real.matrix().get(t.add(-1), t));
            assert_relative_eq!(value, real.query(t.add(-1), QueryKind::Level).unwrap());
        }
        assert_eq!(last.first_period(), Some(p("2000Q3")));
    }

    #[test]
    fn test_actual_growth_restated_at_origin() {
        let real = fixture(16, 4);
        let growth = real.actual_growth().unwrap();
        let t = p("2001Q2");
        let expected = real.query(t.add(3), QueryKind::Growth).unwrap();
        assert_relative_eq!(growth.get(t).unwrap(), expected);
        // x_{t+3} / x_{t-1} in the release of t+4.
        assert_relative_eq!(expected, 108.0 / 106.0 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_actual_level_horizon_one() {
        let real = fixture(8, 1);
        let level = real.actual_level().unwrap();
        assert_relative_eq!(level.get(p("2000Q3")).unwrap(), 102.0);
        assert_eq!(level.len(), 8);
    }

    #[test]
    fn test_rejects_monthly_labels() {
        let matrix = VintageMatrix::from_cells(vec![p("2000-01")], vec![p("2000Q1")], []).unwrap();
        assert!(matches!(
            RealQuarterly::new(matrix, Horizon::default()),
            Err(FireError::InvalidFrequency(_))
        ));
    }
}
