#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/firediagnostics/fire/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod covariates;
pub mod error;
pub mod fire;
pub mod individual;
pub mod period;
pub mod real;
pub mod regression;
pub mod variable;

// Re-export core types
pub use config::{FireConfig, Horizon};
pub use covariates::{CovariateSeries, Covariates};
pub use error::{FireError, Result};
pub use fire::{FireAssembler, FirePanel, FireRow};
pub use individual::{ForecastRecord, IndividualPanel, SurveyPanel};
pub use period::{Frequency, Period};
pub use real::{QueryKind, RealTimeData, RealTimeSeries, VintageMatrix, build_real_time};
pub use regression::{BetaRecord, BetaSeries, WindowGenerator, revision_coefficient, weight};
pub use variable::{SourceFrequency, ValueKind, Variable, VariableRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
