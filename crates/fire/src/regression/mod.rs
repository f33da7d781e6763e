//! Rolling-window FIRE regressions.
//!
//! - [`ols`]: revision coefficient of one sample
//! - [`window`]: windows over the sorted panel
//! - [`beta`]: per-window coefficients and the weight statistic

pub mod beta;
pub mod ols;
pub mod window;

pub use beta::{BetaRecord, BetaSeries, weight};
pub use ols::{RevisionFit, fit_revision, revision_coefficient};
pub use window::{Sample, Window, WindowGenerator, WindowSpan, Windows};
