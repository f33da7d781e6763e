//! Individual forecaster panels.
//!
//! The survey records each forecaster's predictions by horizon column.
//! Depending on the variable's [`ValueKind`] the panel is read as growth
//! forecasts ([`IndividualGrowth`]) or as level forecasts
//! ([`IndividualLevel`]).

pub mod growth;
pub mod level;
pub mod survey;

pub use growth::IndividualGrowth;
pub use level::IndividualLevel;
pub use survey::{ForecastRecord, HORIZON_COLUMNS, SurveyPanel};

use crate::{Horizon, Result, variable::ValueKind};

/// Individual forecasts framed for one variable.
#[derive(Debug, Clone)]
pub enum IndividualPanel {
    /// Level variables: growth framing
    Growth(IndividualGrowth),
    /// Rate variables: level framing
    Level(IndividualLevel),
}

impl IndividualPanel {
    /// Build the variant matching `kind`.
    pub fn for_kind(kind: ValueKind, panel: &SurveyPanel, horizon: Horizon) -> Result<Self> {
        Ok(match kind {
            ValueKind::Level => Self::Growth(IndividualGrowth::new(panel, horizon)?),
            ValueKind::Rate => Self::Level(IndividualLevel::new(panel, horizon)?),
        })
    }

    /// Horizon the panel was built for.
    pub const fn horizon(&self) -> Horizon {
        match self {
            Self::Growth(growth) => growth.horizon(),
            Self::Level(level) => level.horizon(),
        }
    }
}
