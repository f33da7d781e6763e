//! Real-time (vintage) data queries.
//!
//! Survey forecasts are compared with the data a forecaster could actually
//! have seen. Each variable's real-time data comes in one of four layouts
//! (see [`SourceFrequency`]) and every layout answers the same questions
//! through [`RealTimeSeries`]:
//!
//! - `last_level`: `x_{t-1}` as released at `t` (index `t`)
//! - `actual_growth`: `x_{t+h-1} / x_{t-1} - 1`, restated at index `t`
//! - `actual_level`: `x_{t+h-1}`, restated at index `t`
//!
//! Unreleased cells are NaN; accessors drop them instead of failing.

pub mod monthly;
pub mod monthly_normal;
pub mod quarterly;
pub mod quarterly_monthly;
pub mod vintage;

pub use monthly::RealMonthly;
pub use monthly_normal::RealMonthlyNormal;
pub use quarterly::RealQuarterly;
pub use quarterly_monthly::RealQuarterlyMonthly;
pub use vintage::VintageMatrix;

use crate::{
    FireError, Horizon, Result,
    period::Period,
    variable::{SourceFrequency, Variable},
};
use derive_more::Display;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::str::FromStr;

/// What a real-time query returns.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Level as released one period after the observation
    #[display("level")]
    Level,
    /// Growth of the level over the comparison lag
    #[display("growth")]
    Growth,
    /// Level of the following period
    #[display("next_level")]
    NextLevel,
}

impl FromStr for QueryKind {
    type Err = FireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "level" => Ok(Self::Level),
            "growth" => Ok(Self::Growth),
            "next_level" => Ok(Self::NextLevel),
            other => Err(FireError::InvalidKind(other.to_string())),
        }
    }
}

/// A quarterly series with undefined entries removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSeries {
    values: BTreeMap<Period, f64>,
}

impl PeriodSeries {
    /// Value at `period`, if defined.
    pub fn get(&self, period: Period) -> Option<f64> {
        self.values.get(&period).copied()
    }

    /// Entries in period order.
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.values.iter().map(|(p, v)| (*p, *v))
    }

    /// Number of defined entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no entry is defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First defined period.
    pub fn first_period(&self) -> Option<Period> {
        self.values.keys().next().copied()
    }

    /// Two-column frame: `period` (quarter ordinal) and `value_column`.
    pub fn to_frame(&self, value_column: &str) -> Result<DataFrame> {
        let periods: Vec<i32> = self.values.keys().map(|p| p.to_quarter().ordinal()).collect();
        let values: Vec<f64> = self.values.values().copied().collect();
        let df = DataFrame::new(vec![
            Column::new("period".into(), periods),
            Column::new(value_column.into(), values),
        ])?;
        Ok(df)
    }
}

impl FromIterator<(Period, f64)> for PeriodSeries {
    /// Collects entries, dropping NaN values.
    fn from_iter<I: IntoIterator<Item = (Period, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().filter(|(_, v)| !v.is_nan()).collect(),
        }
    }
}

/// Vintage-aware access to one variable's real-time data.
pub trait RealTimeSeries: Send + Sync + std::fmt::Debug {
    /// Value of `kind` for quarter `period`, read from the vintage that
    /// the layout's reporting convention assigns to it.
    ///
    /// Unreleased data gives NaN. Kinds the layout does not support fail
    /// with [`FireError::InvalidKind`].
    fn query(&self, period: Period, kind: QueryKind) -> Result<f64>;

    /// `x_{t-1}` known at the release boundary of `t`, indexed by `t`.
    fn last_level(&self) -> Result<PeriodSeries>;

    /// Realised growth from `t-1` to `t+h-1`, indexed by `t`.
    fn actual_growth(&self) -> Result<PeriodSeries>;

    /// Realised level at `t+h-1`, indexed by `t`.
    fn actual_level(&self) -> Result<PeriodSeries>;

    /// Forecast horizon used by the accessors.
    fn horizon(&self) -> Horizon;
}

/// Real-time input handed over by a loader.
#[derive(Debug, Clone)]
pub enum RealTimeData {
    /// Observation × vintage matrix
    Vintage(VintageMatrix),
    /// Plain monthly observations without revisions
    Observations(Vec<(Period, f64)>),
}

/// Build the real-time series matching the variable's frequency tag.
pub fn build_real_time(
    variable: &Variable,
    data: RealTimeData,
    horizon: Horizon,
) -> Result<Box<dyn RealTimeSeries>> {
    let mismatch = |expected: &str| FireError::SourceMismatch {
        variable: variable.abbreviation.clone(),
        expected: expected.to_string(),
    };

    let series: Box<dyn RealTimeSeries> = match (variable.frequency, data) {
        (SourceFrequency::Quarterly, RealTimeData::Vintage(matrix)) => {
            Box::new(RealQuarterly::new(matrix, horizon)?)
        }
        (SourceFrequency::Monthly, RealTimeData::Vintage(matrix)) => {
            Box::new(RealMonthly::new(matrix, horizon)?)
        }
        (SourceFrequency::QuarterlyMonthly, RealTimeData::Vintage(matrix)) => {
            Box::new(RealQuarterlyMonthly::new(matrix, horizon)?)
        }
        (SourceFrequency::MonthlyNormal, RealTimeData::Observations(observations)) => {
            Box::new(RealMonthlyNormal::new(observations, horizon)?)
        }
        (SourceFrequency::MonthlyNormal, RealTimeData::Vintage(_)) => {
            return Err(mismatch("a monthly observation list"));
        }
        (_, RealTimeData::Observations(_)) => return Err(mismatch("a vintage matrix")),
    };

    tracing::debug!(
        variable = %variable.abbreviation,
        frequency = %variable.frequency,
        horizon = %horizon,
        "built real-time series"
    );
    Ok(series)
}

/// The three months ending with quarter `t`, latest first.
pub(crate) fn trailing_months(t: Period) -> [Period; 3] {
    let last = t.to_quarter().to_month();
    [last, last.add(-1), last.add(-2)]
}
