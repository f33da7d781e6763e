//! Variable registry for the survey's macro series.
//!
//! Every survey variable carries the frequency layout of its real-time data
//! and whether it is a level (forecast as growth) or a rate (forecast as a
//! level). The registry is fixed at start-up.

use crate::{FireError, Result};
use derive_more::Display;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Layout of a variable's real-time data.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFrequency {
    /// Quarterly observations, quarterly vintages (`Q`)
    Quarterly,
    /// Monthly observations, monthly vintages (`M`)
    Monthly,
    /// Monthly observations, quarterly vintages (`QM`)
    QuarterlyMonthly,
    /// Monthly observations without vintages (`MN`)
    MonthlyNormal,
}

impl SourceFrequency {
    /// Registry tag for this layout.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Quarterly => "Q",
            Self::Monthly => "M",
            Self::QuarterlyMonthly => "QM",
            Self::MonthlyNormal => "MN",
        }
    }
}

impl FromStr for SourceFrequency {
    type Err = FireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Q" => Ok(Self::Quarterly),
            "M" => Ok(Self::Monthly),
            "QM" => Ok(Self::QuarterlyMonthly),
            "MN" => Ok(Self::MonthlyNormal),
            other => Err(FireError::InvalidFrequency(other.to_string())),
        }
    }
}

/// How forecasts of a variable are framed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    /// Levels such as GDP; errors and revisions are in growth rates
    Level,
    /// Rates such as unemployment; errors and revisions are in levels
    Rate,
}

impl FromStr for ValueKind {
    type Err = FireError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "level" => Ok(Self::Level),
            "rate" => Ok(Self::Rate),
            other => Err(FireError::InvalidValueKind(other.to_string())),
        }
    }
}

/// A named macro series tracked by the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Human-readable name, e.g. `Real GDP`
    pub name: String,
    /// Survey abbreviation, e.g. `RGDP`
    pub abbreviation: String,
    /// Real-time data layout
    pub frequency: SourceFrequency,
    /// Forecast framing
    pub kind: ValueKind,
}

impl Variable {
    /// Build a variable from registry tags.
    ///
    /// Fails with [`FireError::InvalidFrequency`] or
    /// [`FireError::InvalidValueKind`] on unknown tags.
    pub fn from_tags(name: &str, abbreviation: &str, frequency: &str, kind: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            abbreviation: abbreviation.to_string(),
            frequency: frequency.parse()?,
            kind: kind.parse()?,
        })
    }
}

const DEFAULT_VARIABLES: [(&str, &str, &str, &str); 14] = [
    ("Real GDP", "RGDP", "Q", "level"),
    ("Nominal GDP", "NGDP", "Q", "level"),
    ("Price Index GDP", "PGDP", "Q", "level"),
    ("Real Consumption", "RConsumption", "Q", "level"),
    ("Real Nonresidential Investment", "RNRESIN", "Q", "level"),
    ("Real Residential Investment", "RRESIN", "Q", "level"),
    ("Real Federal Government Consumption", "RFEDGOV", "Q", "level"),
    ("Real State and Local Government Consumption", "RSLGOV", "Q", "level"),
    ("Industry Production Index", "IPT", "M", "level"),
    ("Housing Start", "Housing", "M", "level"),
    ("Unemployment Rate", "Unemployment", "QM", "rate"),
    ("Three-month Treasury Rate", "TB3M", "MN", "rate"),
    ("Ten-year Treasury Rate", "TB10Y", "MN", "rate"),
    ("AAA Corporate Bond Rate", "AAA", "MN", "rate"),
];

/// Registry of survey variables keyed by name.
#[derive(Debug, Default, Clone)]
pub struct VariableRegistry {
    variables: BTreeMap<String, Variable>,
}

impl VariableRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            variables: BTreeMap::new(),
        }
    }

    /// Register the standard survey variables.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, abbreviation, frequency, kind) in DEFAULT_VARIABLES {
            // Tags are literals above; from_tags cannot fail for them.
            if let Ok(variable) = Variable::from_tags(name, abbreviation, frequency, kind) {
                registry.register(variable);
            }
        }
        registry
    }

    /// Register a variable, replacing any previous entry with the same name.
    pub fn register(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Look up a variable by name or abbreviation.
    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.variables
            .get(key)
            .or_else(|| self.variables.values().find(|v| v.abbreviation == key))
    }

    /// Look up a variable, failing with [`FireError::UnknownVariable`].
    pub fn require(&self, key: &str) -> Result<&Variable> {
        self.get(key)
            .ok_or_else(|| FireError::UnknownVariable(key.to_string()))
    }

    /// Variables of one value kind.
    pub fn by_kind(&self, kind: ValueKind) -> Vec<&Variable> {
        self.variables.values().filter(|v| v.kind == kind).collect()
    }

    /// All variables ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
