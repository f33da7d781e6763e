//! Windowed revision coefficients and the weight statistic.
//!
//! For every window the revision coefficient is estimated on the consensus,
//! individual and idiosyncratic samples. The weight
//!
//! `w = (beta_individual - beta_consensus) / (beta_idiosyncratic - beta_consensus)`
//!
//! places the individual coefficient between the consensus (`w = 0`) and
//! the idiosyncratic (`w = 1`) coefficients.

use super::window::{WindowGenerator, WindowSpan};
use crate::{
    FireConfig, Result,
    covariates::Covariates,
    fire::{FirePanel, FireRow, label_periods},
    period::Period,
};
use polars::prelude::*;
use rayon::prelude::*;
use tracing::info;

/// Weight of the idiosyncratic coefficient in the individual one.
///
/// Equal idiosyncratic and consensus coefficients give NaN or an infinity.
pub fn weight(individual: f64, consensus: f64, idiosyncratic: f64) -> f64 {
    (individual - consensus) / (idiosyncratic - consensus)
}

/// Coefficients of one window, keyed by its last period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaRecord {
    /// Last period of the window
    pub period: Period,
    /// Coefficient on consensus revisions
    pub consensus: f64,
    /// Coefficient on individual revisions
    pub individual: f64,
    /// Coefficient on idiosyncratic revisions
    pub idiosyncratic: f64,
    /// See [`weight`]
    pub weight: f64,
    /// Change of `weight` from the previous window; NaN for the first
    pub weight_change: f64,
    /// `100 * weight_change / previous weight`
    pub weight_change_rate: f64,
}

impl BetaRecord {
    /// Record with the weight filled in and no change information yet.
    pub fn new(period: Period, consensus: f64, individual: f64, idiosyncratic: f64) -> Self {
        Self {
            period,
            consensus,
            individual,
            idiosyncratic,
            weight: weight(individual, consensus, idiosyncratic),
            weight_change: f64::NAN,
            weight_change_rate: f64::NAN,
        }
    }
}

/// Beta records of every window, in window order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BetaSeries {
    records: Vec<BetaRecord>,
}

impl BetaSeries {
    /// Estimate over windows of `config.window_size` periods.
    pub fn estimate(rows: Vec<FireRow>, config: &FireConfig) -> Result<Self> {
        config.validate()?;
        let generator = WindowGenerator::new(rows, config.window_size);
        Self::from_generator(&generator, config.parallel)
    }

    /// Estimate from an assembled panel.
    pub fn from_panel(panel: &FirePanel, config: &FireConfig) -> Result<Self> {
        Self::estimate(panel.rows().to_vec(), config)
    }

    /// Estimate every window of `generator`, on the rayon pool when
    /// `parallel` is set. Output order follows the windows either way.
    pub fn from_generator(generator: &WindowGenerator, parallel: bool) -> Result<Self> {
        let beta = |span: &WindowSpan| generator.window(*span).beta();
        let records = if parallel {
            generator.spans().par_iter().map(beta).collect::<Result<Vec<_>>>()?
        } else {
            generator.spans().iter().map(beta).collect::<Result<Vec<_>>>()?
        };

        let series = Self::from_records(records);
        info!(
            windows = series.len(),
            window_size = generator.window_size(),
            parallel,
            "estimated beta series"
        );
        Ok(series)
    }

    /// Fill in weight changes over consecutive records.
    pub fn from_records(mut records: Vec<BetaRecord>) -> Self {
        let mut previous: Option<f64> = None;
        for record in &mut records {
            let (change, rate) = match previous {
                Some(prev) => {
                    let change = record.weight - prev;
                    (change, 100.0 * change / prev)
                }
                None => (f64::NAN, f64::NAN),
            };
            record.weight_change = change;
            record.weight_change_rate = rate;
            previous = Some(record.weight);
        }
        Self { records }
    }

    /// Records in window order.
    pub fn records(&self) -> &[BetaRecord] {
        &self.records
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no window was estimated.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Frame with `period` labels and one column per record field.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut frame = self.ordinal_frame()?;
        label_periods(&mut frame)?;
        Ok(frame)
    }

    /// [`Self::to_frame`] left-joined with `covariates` on the period.
    pub fn to_frame_with(&self, covariates: &Covariates) -> Result<DataFrame> {
        let mut frame = self
            .ordinal_frame()?
            .lazy()
            .join(
                covariates.frame().clone().lazy(),
                [col("period")],
                [col("period")],
                JoinArgs::new(JoinType::Left),
            )
            .sort(["period"], SortMultipleOptions::default())
            .collect()?;
        label_periods(&mut frame)?;
        Ok(frame)
    }

    fn ordinal_frame(&self) -> Result<DataFrame> {
        let column = |name: &str, field: fn(&BetaRecord) -> f64| {
            Column::new(name.into(), self.records.iter().map(field).collect::<Vec<f64>>())
        };
        let df = DataFrame::new(vec![
            Column::new(
                "period".into(),
                self.records
                    .iter()
                    .map(|r| r.period.to_quarter().ordinal())
                    .collect::<Vec<i32>>(),
            ),
            column("consensus", |r| r.consensus),
            column("individual", |r| r.individual),
            column("idiosyncratic", |r| r.idiosyncratic),
            column("weight", |r| r.weight),
            column("weight_change", |r| r.weight_change),
            column("weight_change_rate", |r| r.weight_change_rate),
        ])?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariates::CovariateSeries;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    /// Two forecasters whose revisions differ from the consensus by `±d`.
    fn rows(periods: i32) -> Vec<FireRow> {
        let start = p("1990Q1");
        (0..periods)
            .flat_map(|t| {
                let revision_mean = f64::from(t % 5);
                let error_mean = 0.5 * revision_mean;
                [1i64, 2].into_iter().map(move |id| {
                    let sign = if id == 1 { 1.0 } else { -1.0 };
                    let d = sign * f64::from(1 + t % 3);
                    FireRow {
                        period: start.add(t),
                        id,
                        nowcast: 0.0,
                        forecast: 0.0,
                        actual: 0.0,
                        revision: revision_mean + d,
                        error: error_mean - 0.25 * d,
                        error_mean,
                        revision_mean,
                        error_idio: -0.25 * d,
                        revision_idio: d,
                    }
                })
            })
            .collect()
    }

    #[test]
    fn test_weight() {
        assert_relative_eq!(weight(0.5, 0.2, 0.8), 0.5, epsilon = 1e-12);
        assert!(weight(0.5, 0.2, 0.2).is_infinite());
        assert!(weight(0.2, 0.2, 0.2).is_nan());
    }

    #[test]
    fn test_estimate_coefficients() {
        let config = FireConfig {
            window_size: 10,
            ..FireConfig::default()
        };
        let series = BetaSeries::estimate(rows(30), &config).unwrap();
        assert_eq!(series.len(), 20);

        for record in series.records() {
            assert_relative_eq!(record.consensus, 0.5, epsilon = 1e-9);
            assert_relative_eq!(record.idiosyncratic, -0.25, epsilon = 1e-9);
            assert!(record.individual < 0.5 && record.individual > -0.25);
            let w = weight(record.individual, record.consensus, record.idiosyncratic);
            assert_relative_eq!(record.weight, w, epsilon = 1e-12);
        }
        assert_eq!(series.records()[0].period, p("1992Q2"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = FireConfig {
            window_size: 8,
            ..FireConfig::default()
        };
        let parallel = FireConfig {
            parallel: true,
            ..sequential.clone()
        };
        let a = BetaSeries::estimate(rows(40), &sequential).unwrap();
        let b = BetaSeries::estimate(rows(40), &parallel).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.records().iter().zip(b.records()) {
            assert_eq!(x.period, y.period);
            assert_relative_eq!(x.individual, y.individual, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_weight_change() {
        let q = p("2000Q1");
        let series = BetaSeries::from_records(vec![
            BetaRecord::new(q, 0.0, 0.5, 1.0),
            BetaRecord::new(q.add(1), 0.0, 0.6, 1.0),
            BetaRecord::new(q.add(2), 0.0, 0.3, 1.0),
        ]);
        let records = series.records();
        assert!(records[0].weight_change.is_nan());
        assert!(records[0].weight_change_rate.is_nan());
        assert_relative_eq!(records[1].weight_change, 0.1, epsilon = 1e-12);
        assert_relative_eq!(records[1].weight_change_rate, 20.0, epsilon = 1e-9);
        assert_relative_eq!(records[2].weight_change, -0.3, epsilon = 1e-12);
        assert_relative_eq!(records[2].weight_change_rate, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frames() {
        let q = p("2000Q1");
        let series = BetaSeries::from_records(vec![
            BetaRecord::new(q, 0.0, 0.5, 1.0),
            BetaRecord::new(q.add(1), 0.0, 0.6, 1.0),
        ]);
        let frame = series.to_frame().unwrap();
        assert_eq!(frame.shape(), (2, 7));
        let labels = frame.column("period").unwrap().str().unwrap();
        assert_eq!(labels.get(1), Some("2000Q2"));

        let date = NaiveDate::from_ymd_opt(2000, 2, 1).unwrap();
        let covariates = Covariates::new([CovariateSeries::new("SCL", vec![(date, 3.0)])]).unwrap();
        let merged = series.to_frame_with(&covariates).unwrap();
        assert_eq!(merged.height(), 2);
        let scl = merged.column("SCL").unwrap().f64().unwrap();
        assert_eq!(scl.get(0), Some(3.0));
        assert_eq!(scl.get(1), None);
    }
}
