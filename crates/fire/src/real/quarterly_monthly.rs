//! Monthly observations with quarterly vintages (unemployment rate).
//!
//! Levels are three-month means read from the release of the following
//! quarter. Releases only start at the first vintage quarter, so earlier
//! quarters fall back to that first release.

use super::{PeriodSeries, QueryKind, RealTimeSeries, VintageMatrix, trailing_months};
use crate::{
    FireError, Horizon, Result,
    period::{Frequency, Period},
};

/// Real-time series for quarterly-monthly (`QM`) variables.
#[derive(Debug, Clone)]
pub struct RealQuarterlyMonthly {
    matrix: VintageMatrix,
    horizon: Horizon,
    start_quarter: Option<Period>,
}

impl RealQuarterlyMonthly {
    /// Wrap a monthly × quarterly vintage matrix.
    pub fn new(matrix: VintageMatrix, horizon: Horizon) -> Result<Self> {
        let observations_monthly = matrix
            .observations()
            .iter()
            .all(|p| p.frequency() == Frequency::Monthly);
        let vintages_quarterly = matrix
            .vintages()
            .iter()
            .all(|p| p.frequency() == Frequency::Quarterly);
        if !observations_monthly || !vintages_quarterly {
            return Err(FireError::InvalidFrequency(
                "quarterly-monthly series needs monthly observations and quarterly vintages"
                    .to_string(),
            ));
        }
        let start_quarter = matrix.vintages().first().copied();
        Ok(Self {
            matrix,
            horizon,
            start_quarter,
        })
    }

    /// Release used for quarter `t`: `t+1`, floored at the first vintage.
    pub fn release_for(&self, t: Period) -> Period {
        let next = t.to_quarter().add(1);
        match self.start_quarter {
            Some(start) if next < start => start,
            _ => next,
        }
    }

    /// First and last quarter with monthly observations.
    fn observation_quarters(&self) -> Option<(Period, Period)> {
        let observations = self.matrix.observations();
        Some((
            observations.first()?.to_quarter(),
            observations.last()?.to_quarter(),
        ))
    }

    fn actual(&self, kind: QueryKind) -> Result<PeriodSeries> {
        let Some((first, last)) = self.observation_quarters() else {
            return Ok(PeriodSeries::default());
        };
        let h = self.horizon.offset();
        Period::range_inclusive(first.add(1), last.add(-h))
            .map(|t| Ok((t, self.query(t.add(h - 1), kind)?)))
            .collect()
    }
}

impl RealTimeSeries for RealQuarterlyMonthly {
    fn query(&self, period: Period, kind: QueryKind) -> Result<f64> {
        let months = trailing_months(period);
        let release = self.release_for(period);
        match kind {
            QueryKind::Level => Ok(self.matrix.mean_at(&months, release)),
            QueryKind::Growth => {
                let year_ago = months.map(|m| m.add(-12));
                Ok(self.matrix.mean_at(&months, release) / self.matrix.mean_at(&year_ago, release)
                    - 1.0)
            }
            QueryKind::NextLevel => Err(FireError::InvalidKind(kind.to_string())),
        }
    }

    fn last_level(&self) -> Result<PeriodSeries> {
        let Some((first, last)) = self.observation_quarters() else {
            return Ok(PeriodSeries::default());
        };
        Period::range_inclusive(first.add(1), last.add(-1))
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

    /// Monthly unemployment 1999-01..2002-12; quarterly releases from
    /// 2000Q1 contain every month before the release quarter, at
    /// `5 + i / 100 + release index`.
    fn fixture() -> RealQuarterlyMonthly {
        let first_month = p("1999-01");
        let months: Vec<Period> = (0..48).map(|i| first_month.add(i)).collect();
        let first_release = p("2000Q1");
        let releases: Vec<Period> = (0..12).map(|j| first_release.add(j)).collect();
        let cells = months.iter().enumerate().flat_map(|(i, &m)| {
            releases.iter().enumerate().filter_map(move |(j, &r)| {
                (m.to_quarter() < r).then_some((m, r, 5.0 + i as f64 / 100.0 + j as f64))
            })
        });
        let matrix = VintageMatrix::from_cells(months.clone(), releases.clone(), cells).unwrap();
        RealQuarterlyMonthly::new(matrix, Horizon::default()).unwrap()
    }

    #[test]
    fn test_release_floor() {
        let real = fixture();
        assert_eq!(real.release_for(p("1999Q2")), p("2000Q1"));
        assert_eq!(real.release_for(p("2000Q3")), p("2000Q4"));
    }

    #[test]
    fn test_level_uses_floored_release() {
        let real = fixture();
        // 1999Q2 = months 3, 4, 5 read from the first release (j = 0).
        let level = real.query(p("1999Q2"), QueryKind::Level).unwrap();
        assert_relative_eq!(level, 5.04, epsilon = 1e-12);
        // 2000Q3 = months 18, 19, 20 read from 2000Q4 (j = 3).
        let level = real.query(p("2000Q3"), QueryKind::Level).unwrap();
        assert_relative_eq!(level, 5.0 + 0.19 + 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_growth_and_next_level() {
        let real = fixture();
        let growth = real.query(p("2000Q3"), QueryKind::Growth).unwrap();
        assert_relative_eq!(growth, 8.19 / 8.07 - 1.0, epsilon = 1e-12);
        assert!(matches!(
            real.query(p("2000Q3"), QueryKind::NextLevel),
            Err(FireError::InvalidKind(_))
        ));
    }

    #[test]
    fn test_accessor_ranges() {
        let real = fixture();
        let last = real.last_level().unwrap();
        assert_eq!(last.first_period(), Some(p("1999Q2")));
        assert_relative_eq!(
            last.get(p("2000Q4")).unwrap(),
            real.query(p("2000Q3"), QueryKind::Level).unwrap()
        );

        let level = real.actual_level().unwrap();
        assert_eq!(level.first_period(), Some(p("1999Q2")));
        assert!(level.iter().all(|(t, _)| t <= p("2001Q4")));
    }
}
