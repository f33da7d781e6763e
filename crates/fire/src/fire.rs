//! FIRE panel assembly.
//!
//! Joins a forecaster panel with real-time outcomes:
//!
//! - growth variables: `nowcast = F_t x_{t+h-1} / x_{t-1} - 1`,
//!   `forecast = F_{t-1} x_{t+h-1} / F_{t-1} x_{t-1} - 1`,
//!   `actual = x_{t+h-1} / x_{t-1} - 1`
//! - rate variables: `nowcast = F_t x_{t+h-1}`,
//!   `forecast = F_{t-1} x_{t+h-1}`, `actual = x_{t+h-1}`
//!
//! and in both cases `revision = nowcast - forecast`,
//! `error = actual - nowcast`. All joins are inner joins, so a period or
//! forecaster missing on any side simply drops out.

use crate::{
    FireConfig, Result,
    covariates::Covariates,
    individual::{IndividualPanel, SurveyPanel},
    period::{Frequency, Period},
    real::{RealTimeData, RealTimeSeries, build_real_time},
    variable::Variable,
};
use polars::prelude::*;
use tracing::{debug, info};

/// One forecaster's aligned observation for one period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRow {
    /// Survey quarter
    pub period: Period,
    /// Forecaster id
    pub id: i64,
    /// Current forecast of the target
    pub nowcast: f64,
    /// Same forecaster's forecast of the target one survey earlier
    pub forecast: f64,
    /// Realised target
    pub actual: f64,
    /// `nowcast - forecast`
    pub revision: f64,
    /// `actual - nowcast`
    pub error: f64,
    /// Cross-sectional mean of `error` in this period
    pub error_mean: f64,
    /// Cross-sectional mean of `revision` in this period
    pub revision_mean: f64,
    /// `error - error_mean`
    pub error_idio: f64,
    /// `revision - revision_mean`
    pub revision_idio: f64,
}

/// Builds [`FirePanel`]s from real-time data and survey panels.
#[derive(Debug, Clone)]
pub struct FireAssembler {
    min_observations: usize,
}

impl Default for FireAssembler {
    fn default() -> Self {
        Self::from_config(&FireConfig::default())
    }
}

impl FireAssembler {
    /// Assembler dropping forecasters with fewer than `min_observations`
    /// rows.
    pub const fn new(min_observations: usize) -> Self {
        Self { min_observations }
    }

    /// Assembler using the configured observation floor.
    pub const fn from_config(config: &FireConfig) -> Self {
        Self::new(config.min_observations)
    }

    /// Build the panel for one registry variable from raw inputs.
    pub fn build(
        variable: &Variable,
        data: RealTimeData,
        survey: &SurveyPanel,
        config: &FireConfig,
    ) -> Result<FirePanel> {
        config.validate()?;
        let horizon = config.horizon()?;
        let real = build_real_time(variable, data, horizon)?;
        let individual = IndividualPanel::for_kind(variable.kind, survey, horizon)?;
        let panel = Self::from_config(config).assemble(real.as_ref(), &individual)?;

        info!(
            variable = %variable.abbreviation,
            rows = panel.len(),
            periods = panel.periods().len(),
            forecasters = panel.forecaster_count(),
            "assembled FIRE panel"
        );
        Ok(panel)
    }

    /// Join individual forecasts with real-time outcomes.
    pub fn assemble(
        &self,
        real: &dyn RealTimeSeries,
        individual: &IndividualPanel,
    ) -> Result<FirePanel> {
        let by_period = || [col("period")];
        let by_period_id = || [col("period"), col("id")];
        let inner = || JoinArgs::new(JoinType::Inner);

        let joined = match individual {
            IndividualPanel::Growth(growth) => {
                let last_level = real.last_level()?.to_frame("last_level")?;
                let actual = real.actual_growth()?.to_frame("actual")?;
                growth
                    .nowcast()
                    .clone()
                    .lazy()
                    .join(last_level.lazy(), by_period(), by_period(), inner())
                    .with_column((col("nowcast") / col("last_level") - lit(1.0)).alias("nowcast"))
                    .join(
                        growth.forecast().clone().lazy(),
                        by_period_id(),
                        by_period_id(),
                        inner(),
                    )
                    .join(actual.lazy(), by_period(), by_period(), inner())
            }
            IndividualPanel::Level(level) => {
                let actual = real.actual_level()?.to_frame("actual")?;
                level
                    .revision()
                    .clone()
                    .lazy()
                    .join(actual.lazy(), by_period(), by_period(), inner())
            }
        };

        let unfiltered = joined
            .select([
                col("period"),
                col("id"),
                col("nowcast"),
                col("forecast"),
                col("actual"),
            ])
            .with_columns([
                (col("nowcast") - col("forecast")).alias("revision"),
                (col("actual") - col("nowcast")).alias("error"),
            ])
            .collect()?;
        debug!(rows = unfiltered.height(), "joined forecasts with outcomes");

        let frame = unfiltered
            .lazy()
            .filter(len().over([col("id")]).gt_eq(lit(self.min_observations as IdxSize)))
            .with_columns([
                col("error").mean().over([col("period")]).alias("error_mean"),
                col("revision").mean().over([col("period")]).alias("revision_mean"),
            ])
            .with_columns([
                (col("error") - col("error_mean")).alias("error_idio"),
                (col("revision") - col("revision_mean")).alias("revision_idio"),
            ])
            .sort(["period", "id"], SortMultipleOptions::default())
            .collect()?;

        FirePanel::from_frame(frame)
    }
}

/// The assembled, immutable FIRE panel sorted by (period, id).
#[derive(Debug, Clone)]
pub struct FirePanel {
    frame: DataFrame,
    rows: Vec<FireRow>,
}

impl FirePanel {
    fn from_frame(frame: DataFrame) -> Result<Self> {
        let periods = frame.column("period")?.i32()?;
        let ids = frame.column("id")?.i64()?;
        let nowcast = f64_values(&frame, "nowcast")?;
        let forecast = f64_values(&frame, "forecast")?;
        let actual = f64_values(&frame, "actual")?;
        let revision = f64_values(&frame, "revision")?;
        let error = f64_values(&frame, "error")?;
        let error_mean = f64_values(&frame, "error_mean")?;
        let revision_mean = f64_values(&frame, "revision_mean")?;
        let error_idio = f64_values(&frame, "error_idio")?;
        let revision_idio = f64_values(&frame, "revision_idio")?;

        let rows = periods
            .into_iter()
            .zip(ids.into_iter())
            .enumerate()
            .filter_map(|(i, (period, id))| {
                Some(FireRow {
                    period: Period::from_ordinal(period?, Frequency::Quarterly),
                    id: id?,
                    nowcast: nowcast[i],
                    forecast: forecast[i],
                    actual: actual[i],
                    revision: revision[i],
                    error: error[i],
                    error_mean: error_mean[i],
                    revision_mean: revision_mean[i],
                    error_idio: error_idio[i],
                    revision_idio: revision_idio[i],
                })
            })
            .collect();

        Ok(Self { frame, rows })
    }

    /// The panel as a frame with quarter ordinals in `period`.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Rows sorted by (period, id).
    pub fn rows(&self) -> &[FireRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the panel is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct periods in order.
    pub fn periods(&self) -> Vec<Period> {
        let mut periods: Vec<Period> = self.rows.iter().map(|r| r.period).collect();
        periods.dedup();
        periods
    }

    /// Number of distinct forecasters.
    pub fn forecaster_count(&self) -> usize {
        let mut ids: Vec<i64> = self.rows.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// Consensus series: `period`, `error`, `revision`, one row per period,
    /// inner-joined with `covariates` when given.
    pub fn consensus_frame(&self, covariates: Option<&Covariates>) -> Result<DataFrame> {
        let consensus = self
            .frame
            .clone()
            .lazy()
            .group_by_stable([col("period")])
            .agg([
                col("error_mean").first().alias("error"),
                col("revision_mean").first().alias("revision"),
            ]);
        output_frame(consensus, covariates)
    }

    /// Individual series: `period`, `id`, `error`, `revision`,
    /// `error_idio`, `revision_idio`, inner-joined with `covariates` when
    /// given.
    pub fn individual_frame(&self, covariates: Option<&Covariates>) -> Result<DataFrame> {
        let individual = self.frame.clone().lazy().select([
            col("period"),
            col("id"),
            col("error"),
            col("revision"),
            col("error_idio"),
            col("revision_idio"),
        ]);
        output_frame(individual, covariates)
    }
}

fn f64_values(frame: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(frame
        .column(name)?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Optionally merge covariates, then replace quarter ordinals in `period`
/// with labels such as `1990Q1`.
fn output_frame(frame: LazyFrame, covariates: Option<&Covariates>) -> Result<DataFrame> {
    let frame = match covariates {
        Some(covariates) => frame.join(
            covariates.frame().clone().lazy(),
            [col("period")],
            [col("period")],
            JoinArgs::new(JoinType::Inner),
        ),
        None => frame,
    };
    let mut frame = frame.collect()?;
    label_periods(&mut frame)?;
    Ok(frame)
}

/// Replace the `period` ordinal column with quarter labels.
pub(crate) fn label_periods(frame: &mut DataFrame) -> Result<()> {
    let labels: Vec<Option<String>> = frame
        .column("period")?
        .i32()?
        .into_iter()
        .map(|ordinal| ordinal.map(|o| Period::from_ordinal(o, Frequency::Quarterly).to_string()))
        .collect();
    frame.with_column(Column::new("period".into(), labels))?;
    Ok(())
}
