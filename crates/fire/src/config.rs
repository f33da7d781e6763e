//! Run configuration.
//!
//! [`FireConfig`] gathers the horizon, window, observation floor and seed
//! into one explicit value handed to every stage.

use crate::{FireError, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default forecast horizon in quarters (t−1 to t+3).
pub const DEFAULT_FORECAST_HORIZON: usize = 4;
/// Default rolling window width in quarters.
pub const DEFAULT_WINDOW_SIZE: usize = 80;
/// Default minimum number of rows a forecaster needs across the sample.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 10;

/// A validated forecast horizon in quarters.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Horizon(usize);

impl Horizon {
    /// Validate a horizon, failing with [`FireError::InvalidHorizon`]
    /// outside `1..=4`.
    pub fn new(quarters: usize) -> Result<Self> {
        if (1..=4).contains(&quarters) {
            Ok(Self(quarters))
        } else {
            Err(FireError::InvalidHorizon(quarters))
        }
    }

    /// Horizon in quarters.
    pub const fn get(self) -> usize {
        self.0
    }

    /// Horizon as a signed period offset.
    pub const fn offset(self) -> i32 {
        self.0 as i32
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(DEFAULT_FORECAST_HORIZON)
    }
}

/// Configuration for one FIRE run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireConfig {
    /// Forecast horizon in quarters, 1..=4.
    pub forecast_horizon: usize,
    /// Number of consecutive periods per regression window.
    pub window_size: usize,
    /// Forecasters with fewer rows than this are dropped from the panel.
    pub min_observations: usize,
    /// Seed for randomized routines. The FIRE pipeline itself is
    /// deterministic; the seed is recorded with each run.
    pub seed: u64,
    /// Evaluate windows on the rayon thread pool.
    pub parallel: bool,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            forecast_horizon: DEFAULT_FORECAST_HORIZON,
            window_size: DEFAULT_WINDOW_SIZE,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            seed: 0,
            parallel: false,
        }
    }
}

impl FireConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        Horizon::new(self.forecast_horizon)?;
        if self.window_size == 0 {
            return Err(FireError::InvalidConfig(
                "window_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The validated forecast horizon.
    pub fn horizon(&self) -> Result<Horizon> {
        Horizon::new(self.forecast_horizon)
    }
}
