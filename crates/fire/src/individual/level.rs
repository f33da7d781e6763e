//! Individual forecasts of rate variables, kept in levels.
//!
//! revision (index `t`): `F_t x_{t+h-1} - F_{t-1} x_{t+h-1}`. Both sides
//! target the same quarter; the older one comes from the forecaster's
//! previous survey response at horizon `h`.

use super::survey::{HORIZON_COLUMNS, SurveyPanel};
use crate::{Horizon, Result};
use polars::prelude::*;

/// Nowcast, lagged forecast and revision per forecaster.
#[derive(Debug, Clone)]
pub struct IndividualLevel {
    revision: DataFrame,
    horizon: Horizon,
}

impl IndividualLevel {
    /// Derive the revision frame from a survey panel.
    pub fn new(panel: &SurveyPanel, horizon: Horizon) -> Result<Self> {
        let h = horizon.get();

        let current = panel.frame().clone().lazy().select([
            col("period"),
            col("id"),
            col(HORIZON_COLUMNS[h - 1]).alias("nowcast"),
        ]);
        let previous = panel.frame().clone().lazy().select([
            (col("period") + lit(1)).alias("period"),
            col("id"),
            col(HORIZON_COLUMNS[h]).alias("forecast"),
        ]);

        let revision = current
            .join(
                previous,
                [col("period"), col("id")],
                [col("period"), col("id")],
                JoinArgs::new(JoinType::Inner),
            )
            .with_column((col("nowcast") - col("forecast")).alias("revision"))
            .drop_nulls(None)
            .sort(["period", "id"], SortMultipleOptions::default())
            .collect()?;

        Ok(Self { revision, horizon })
    }

    /// `period`, `id`, `nowcast`, `forecast`, `revision`.
    pub const fn revision(&self) -> &DataFrame {
        &self.revision
    }

    /// Horizon the frame was built for.
    pub const fn horizon(&self) -> Horizon {
        self.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::individual::ForecastRecord;
    use crate::period::Period;
    use approx::assert_relative_eq;

    fn rate(period: Period, id: i64, h3: Option<f64>, h4: Option<f64>) -> ForecastRecord {
        ForecastRecord {
            period,
            id,
            values: [Some(5.0), Some(5.0), Some(5.0), h3, h4],
        }
    }

    #[test]
    fn test_revision_pairs_consecutive_surveys() {
        let q1: Period = "2000Q1".parse().unwrap();
        let panel = SurveyPanel::from_records([
            rate(q1, 1, Some(4.0), Some(4.5)),
            rate(q1.add(1), 1, Some(4.8), Some(5.0)),
            rate(q1.add(2), 1, Some(5.1), None),
            // Skips 2000Q2, so its 2000Q3 response has no predecessor.
            rate(q1, 2, Some(6.0), Some(6.0)),
            rate(q1.add(2), 2, Some(6.5), Some(6.5)),
        ])
        .unwrap();

        let level = IndividualLevel::new(&panel, Horizon::default()).unwrap();
        let frame = level.revision();
        assert_eq!(frame.height(), 2);

        let revision = frame.column("revision").unwrap().f64().unwrap();
        assert_relative_eq!(revision.get(0).unwrap(), 4.8 - 4.5, epsilon = 1e-12);
        assert_relative_eq!(revision.get(1).unwrap(), 5.1 - 5.0, epsilon = 1e-12);

        let ids = frame.column("id").unwrap().i64().unwrap();
        assert!(ids.into_no_null_iter().all(|id| id == 1));
    }
}
