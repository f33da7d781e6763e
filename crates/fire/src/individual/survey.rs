//! Survey forecast panels.
//!
//! One row per (period, forecaster) with the forecaster's predictions in
//! horizon columns `h0` through `h4`. `h0` is the base the growth framing
//! divides by; `h{h-1}` and `h{h}` are read as the current and the next
//! survey's forecast of the target quarter.

use crate::{
    FireError, Result,
    period::{Frequency, Period},
};
use polars::prelude::*;
use std::collections::HashSet;

/// Column names of the five horizon values.
pub const HORIZON_COLUMNS: [&str; 5] = ["h0", "h1", "h2", "h3", "h4"];

/// One forecaster's survey response for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    /// Survey quarter
    pub period: Period,
    /// Forecaster id
    pub id: i64,
    /// Forecasts at horizons 0..=4; `None` when not submitted
    pub values: [Option<f64>; 5],
}

/// A validated survey panel for one variable.
///
/// # Columns
/// - `period`: survey quarter ordinal (`Int32`)
/// - `id`: forecaster id (`Int64`)
/// - `h0`..`h4`: forecasts (`Float64`, nullable)
#[derive(Debug, Clone)]
pub struct SurveyPanel {
    frame: DataFrame,
}

impl SurveyPanel {
    /// Build a panel from records.
    ///
    /// NaN values are treated as missing. Fails with
    /// [`FireError::DuplicateRecord`] if a (period, id) pair repeats.
    pub fn from_records(records: impl IntoIterator<Item = ForecastRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut periods = Vec::new();
        let mut ids = Vec::new();
        let mut horizons: [Vec<Option<f64>>; 5] = Default::default();

        for record in records {
            let period = record.period.to_quarter();
            if !seen.insert((period, record.id)) {
                return Err(FireError::DuplicateRecord {
                    period: period.to_string(),
                    id: record.id,
                });
            }
            periods.push(period.ordinal());
            ids.push(record.id);
            for (column, value) in horizons.iter_mut().zip(record.values) {
                column.push(value.filter(|v| !v.is_nan()));
            }
        }

        let mut columns = vec![
            Column::new("period".into(), periods),
            Column::new("id".into(), ids),
        ];
        columns.extend(
            HORIZON_COLUMNS
                .iter()
                .zip(horizons)
                .map(|(name, values)| Column::new((*name).into(), values)),
        );
        Self::sorted(DataFrame::new(columns)?)
    }

    /// Validate and normalise a loader-provided frame.
    ///
    /// `period` must already hold quarter ordinals (see
    /// [`Period::ordinal`]).
    pub fn from_frame(frame: DataFrame) -> Result<Self> {
        for name in ["period", "id"].iter().chain(HORIZON_COLUMNS.iter()) {
            if frame.column(name).is_err() {
                return Err(FireError::MissingColumn((*name).to_string()));
            }
        }

        let mut exprs = vec![
            col("period").cast(DataType::Int32),
            col("id").cast(DataType::Int64),
        ];
        exprs.extend(
            HORIZON_COLUMNS
                .iter()
                .map(|name| col(*name).cast(DataType::Float64)),
        );
        let frame = frame.lazy().select(exprs).collect()?;

        let periods = frame.column("period")?.i32()?;
        let ids = frame.column("id")?.i64()?;
        let mut seen = HashSet::new();
        for (period, id) in periods.into_iter().zip(ids.into_iter()) {
            if let (Some(period), Some(id)) = (period, id) {
                if !seen.insert((period, id)) {
                    return Err(FireError::DuplicateRecord {
                        period: Period::from_ordinal(period, Frequency::Quarterly)
                            .to_string(),
                        id,
                    });
                }
            }
        }

        Self::sorted(frame)
    }

    fn sorted(frame: DataFrame) -> Result<Self> {
        let frame = frame
            .lazy()
            .sort(["period", "id"], SortMultipleOptions::default())
            .collect()?;
        Ok(Self { frame })
    }

    /// The normalised panel.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of (period, id) rows.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}
