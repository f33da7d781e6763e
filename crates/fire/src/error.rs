//! Error types for FIRE computations.

use thiserror::Error;

/// Result type for FIRE operations.
pub type Result<T> = std::result::Result<T, FireError>;

/// Errors that can occur while building or querying FIRE inputs.
///
/// Only configuration and construction problems are reported here. Sparse
/// data is handled by dropping rows or propagating NaN instead.
#[derive(Debug, Error)]
pub enum FireError {
    /// Unsupported real-time query kind
    #[error("Invalid query kind: {0} (expected level, growth or next_level)")]
    InvalidKind(String),

    /// Forecast horizon outside 1..=4
    #[error("Invalid forecast horizon: {0} (must be in 1..=4)")]
    InvalidHorizon(usize),

    /// Unrecognised frequency tag in the variable registry
    #[error("Invalid frequency tag: {0}")]
    InvalidFrequency(String),

    /// Unrecognised value kind in the variable registry
    #[error("Invalid value kind: {0}")]
    InvalidValueKind(String),

    /// Period label that could not be parsed
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Vintage matrix labels do not match the value array
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape implied by the period labels
        expected: (usize, usize),
        /// Shape of the value array
        actual: (usize, usize),
    },

    /// Two survey records share a (period, id) key
    #[error("Duplicate forecast record for forecaster {id} at {period}")]
    DuplicateRecord {
        /// Period label of the duplicated record
        period: String,
        /// Forecaster id of the duplicated record
        id: i64,
    },

    /// Missing required column in input data
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Real-time data layout does not fit the variable's frequency tag
    #[error("Real-time data for {variable} must be {expected}")]
    SourceMismatch {
        /// Variable abbreviation
        variable: String,
        /// Expected data layout
        expected: String,
    },

    /// Variable not found in registry
    #[error("Variable not found: {0}")]
    UnknownVariable(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Configuration file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
