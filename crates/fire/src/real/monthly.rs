//! Monthly observations with monthly vintages (industrial production,
//! housing starts).
//!
//! A quarter's level is the mean of its three months as published in the
//! month after the quarter ends. Growth is year over year: the same three
//! months twelve months earlier, from the same release.

use super::{PeriodSeries, QueryKind, RealTimeSeries, VintageMatrix, trailing_months};
use crate::{
    FireError, Horizon, Result,
    period::{Frequency, Period},
};

/// Real-time series for monthly (`M`) variables.
#[derive(Debug, Clone)]
pub struct RealMonthly {
    matrix: VintageMatrix,
    horizon: Horizon,
}

impl RealMonthly {
    /// Wrap a monthly × monthly vintage matrix.
    pub fn new(matrix: VintageMatrix, horizon: Horizon) -> Result<Self> {
        let monthly = |labels: &[Period]| labels.iter().all(|p| p.frequency() == Frequency::Monthly);
        if !monthly(matrix.observations()) || !monthly(matrix.vintages()) {
            return Err(FireError::InvalidFrequency(
                "monthly series needs monthly observations and vintages".to_string(),
            ));
        }
        Ok(Self { matrix, horizon })
    }

    /// First and last quarter covered by the releases.
    fn vintage_quarters(&self) -> Option<(Period, Period)> {
        let vintages = self.matrix.vintages();
        Some((
            vintages.first()?.to_quarter(),
            vintages.last()?.to_quarter(),
        ))
    }

    fn actual(&self, kind: QueryKind) -> Result<PeriodSeries> {
        let Some((first, last)) = self.vintage_quarters() else {
            return Ok(PeriodSeries::default());
        };
        let h = self.horizon.offset();
        Period::range_inclusive(first, last.add(-h))
            .map(|t| Ok((t, self.query(t.add(h - 1), kind)?)))
            .collect()
    }
}

impl RealTimeSeries for RealMonthly {
    fn query(&self, period: Period, kind: QueryKind) -> Result<f64> {
        let months = trailing_months(period);
        let release = months[0].add(1);
        let level = self.matrix.mean_at(&months, release);
        match kind {
            QueryKind::Level | QueryKind::NextLevel => Ok(level),
            QueryKind::Growth => {
                let year_ago = months.map(|m| m.add(-12));
                Ok(level / self.matrix.mean_at(&year_ago, release) - 1.0)
            }
        }
    }

    fn last_level(&self) -> Result<PeriodSeries> {
        let Some((first, last)) = self.vintage_quarters() else {
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
