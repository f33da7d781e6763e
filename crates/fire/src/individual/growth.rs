//! Individual forecasts of level variables, framed as growth rates.
//!
//! nowcast (index `t`): `F_t x_{t+h-1}`, the raw level forecast. The
//! assembler turns it into growth over the last released level.
//!
//! forecast (index `t`): `F_{t-1} x_{t+h-1} / F_{t-1} x_{t-1} - 1`, the
//! growth the same forecaster expected one survey earlier.

use super::survey::{HORIZON_COLUMNS, SurveyPanel};
use crate::{Horizon, Result};
use polars::prelude::*;

/// Nowcast and lagged growth forecast per forecaster.
#[derive(Debug, Clone)]
pub struct IndividualGrowth {
    nowcast: DataFrame,
    forecast: DataFrame,
    horizon: Horizon,
}

impl IndividualGrowth {
    /// Derive the nowcast and forecast frames from a survey panel.
    pub fn new(panel: &SurveyPanel, horizon: Horizon) -> Result<Self> {
        let h = horizon.get();
        let nowcast_column = HORIZON_COLUMNS[h - 1];
        let target_column = HORIZON_COLUMNS[h];

        let nowcast = panel
            .frame()
            .clone()
            .lazy()
            .select([
                col("period"),
                col("id"),
                col(nowcast_column).alias("nowcast"),
            ])
            .drop_nulls(None)
            .sort(["period", "id"], SortMultipleOptions::default())
            .collect()?;

        // A response at t-1 becomes the forecast compared at t.
        let forecast = panel
            .frame()
            .clone()
            .lazy()
            .select([
                (col("period") + lit(1)).alias("period"),
                col("id"),
                (col(target_column) / col(HORIZON_COLUMNS[0]) - lit(1.0)).alias("forecast"),
            ])
            .drop_nulls(None)
            .sort(["period", "id"], SortMultipleOptions::default())
            .collect()?;

        Ok(Self {
            nowcast,
            forecast,
            horizon,
        })
    }

    /// `period`, `id`, `nowcast`.
    pub const fn nowcast(&self) -> &DataFrame {
        &self.nowcast
    }

    /// `period`, `id`, `forecast`.
    pub const fn forecast(&self) -> &DataFrame {
        &self.forecast
    }

    /// Horizon the frames were built for.
    pub const fn horizon(&self) -> Horizon {
        self.horizon
    }
}
