//! Exogenous covariates merged into output frames.
//!
//! Each covariate is a dated series (daily or monthly uncertainty indices,
//! for example) averaged to quarters. Several covariates are combined with
//! an outer merge on the quarter, so a quarter covered by any series is
//! kept and the others hold nulls there.

use crate::{
    FireError, Result,
    period::{Frequency, Period},
};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// One dated covariate series.
#[derive(Debug, Clone, PartialEq)]
pub struct CovariateSeries {
    name: String,
    scale: f64,
    observations: Vec<(NaiveDate, f64)>,
}

impl CovariateSeries {
    /// A series named `name` from dated observations.
    pub fn new(name: impl Into<String>, observations: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            name: name.into(),
            scale: 1.0,
            observations,
        }
    }

    /// Multiply every quarterly value by `scale` (`0.01` turns an index
    /// quoted in percent into a fraction).
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Column name of the series.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quarterly means, NaN observations skipped.
    pub fn quarterly(&self) -> BTreeMap<Period, f64> {
        let mut sums: BTreeMap<Period, (f64, usize)> = BTreeMap::new();
        for (date, value) in &self.observations {
            if value.is_nan() {
                continue;
            }
            let entry = sums
                .entry(Period::from_date(*date, Frequency::Quarterly))
                .or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(period, (sum, count))| (period, self.scale * sum / count as f64))
            .collect()
    }
}

/// Quarterly covariates keyed by `period` (quarter ordinal).
#[derive(Debug, Clone)]
pub struct Covariates {
    frame: DataFrame,
    names: Vec<String>,
}

impl Covariates {
    /// Average every series to quarters and outer-merge them.
    ///
    /// Fails with [`FireError::InvalidConfig`] when two series share a name
    /// or a series is called `period`.
    pub fn new(series: impl IntoIterator<Item = CovariateSeries>) -> Result<Self> {
        let mut names = Vec::new();
        let mut quarterly = Vec::new();
        for s in series {
            if s.name == "period" || names.contains(&s.name) {
                return Err(FireError::InvalidConfig(format!(
                    "covariate name {:?} is reserved or already used",
                    s.name
                )));
            }
            quarterly.push(s.quarterly());
            names.push(s.name);
        }

        let periods: BTreeSet<Period> = quarterly.iter().flat_map(|q| q.keys().copied()).collect();
        let mut columns = vec![Column::new(
            "period".into(),
            periods.iter().map(|p| p.ordinal()).collect::<Vec<i32>>(),
        )];
        for (name, values) in names.iter().zip(&quarterly) {
            let column: Vec<Option<f64>> = periods.iter().map(|p| values.get(p).copied()).collect();
            columns.push(Column::new(name.as_str().into(), column));
        }

        tracing::debug!(
            covariates = names.len(),
            periods = periods.len(),
            "merged covariates"
        );
        Ok(Self {
            frame: DataFrame::new(columns)?,
            names,
        })
    }

    /// `period` plus one nullable column per covariate.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Covariate names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of quarters covered by any covariate.
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    /// Whether no quarter is covered.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}
