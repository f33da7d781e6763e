//! Calendar periods at quarterly or monthly granularity.
//!
//! A [`Period`] is a plain value: an ordinal count of quarters (or months)
//! since year 0 plus its [`Frequency`]. Arithmetic is done with [`Period::add`]
//! and frequency conversion is always explicit ([`Period::to_quarter`],
//! [`Period::to_month`]). Panels join on quarterly ordinals, so monthly
//! periods must be coarsened before they meet survey data.

use crate::{FireError, Result};
use chrono::{Datelike, NaiveDate};
use derive_more::Display;
use std::fmt;
use std::str::FromStr;

/// Granularity of a [`Period`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frequency {
    /// Calendar quarter
    Quarterly,
    /// Calendar month
    Monthly,
}

impl Frequency {
    /// Number of sub-periods per year.
    pub const fn per_year(self) -> i32 {
        match self {
            Self::Quarterly => 4,
            Self::Monthly => 12,
        }
    }
}

/// A calendar quarter or month.
///
/// Ordering compares frequency first and then position in time, so only
/// periods of the same frequency should be compared in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    frequency: Frequency,
    ordinal: i32,
}

impl Period {
    /// Create a period from a year and a 1-based quarter or month number.
    pub fn new(year: i32, sub_period: u32, frequency: Frequency) -> Result<Self> {
        let per_year = frequency.per_year() as u32;
        if sub_period == 0 || sub_period > per_year {
            return Err(FireError::InvalidPeriod(format!(
                "{year} sub-period {sub_period} out of range for {frequency}"
            )));
        }
        Ok(Self {
            frequency,
            ordinal: year * frequency.per_year() + (sub_period as i32 - 1),
        })
    }

    /// Quarter `q` (1..=4) of `year`.
    pub fn quarter(year: i32, q: u32) -> Result<Self> {
        Self::new(year, q, Frequency::Quarterly)
    }

    /// Month `m` (1..=12) of `year`.
    pub fn month(year: i32, m: u32) -> Result<Self> {
        Self::new(year, m, Frequency::Monthly)
    }

    /// Rebuild a period from its ordinal.
    pub const fn from_ordinal(ordinal: i32, frequency: Frequency) -> Self {
        Self { frequency, ordinal }
    }

    /// The period containing `date`.
    pub fn from_date(date: NaiveDate, frequency: Frequency) -> Self {
        let month0 = date.month0() as i32;
        let sub = match frequency {
            Frequency::Quarterly => month0 / 3,
            Frequency::Monthly => month0,
        };
        Self {
            frequency,
            ordinal: date.year() * frequency.per_year() + sub,
        }
    }

    /// Ordinal position in time at this period's frequency.
    pub const fn ordinal(self) -> i32 {
        self.ordinal
    }

    /// Granularity of this period.
    pub const fn frequency(self) -> Frequency {
        self.frequency
    }

    /// Calendar year.
    pub const fn year(self) -> i32 {
        self.ordinal.div_euclid(self.frequency.per_year())
    }

    /// 1-based quarter or month within the year.
    pub const fn sub_period(self) -> u32 {
        self.ordinal.rem_euclid(self.frequency.per_year()) as u32 + 1
    }

    /// Shift by `k` periods of the same frequency.
    #[must_use]
    pub const fn add(self, k: i32) -> Self {
        Self {
            frequency: self.frequency,
            ordinal: self.ordinal + k,
        }
    }

    /// Number of periods from `other` to `self` (`self - other`).
    pub fn offset_from(self, other: Self) -> Result<i32> {
        if self.frequency != other.frequency {
            return Err(FireError::InvalidPeriod(format!(
                "cannot subtract {other} from {self} across frequencies"
            )));
        }
        Ok(self.ordinal - other.ordinal)
    }

    /// The quarter containing this period.
    #[must_use]
    pub const fn to_quarter(self) -> Self {
        match self.frequency {
            Frequency::Quarterly => self,
            Frequency::Monthly => Self {
                frequency: Frequency::Quarterly,
                ordinal: self.ordinal.div_euclid(3),
            },
        }
    }

    /// The last month of this period.
    #[must_use]
    pub const fn to_month(self) -> Self {
        match self.frequency {
            Frequency::Monthly => self,
            Frequency::Quarterly => Self {
                frequency: Frequency::Monthly,
                ordinal: self.ordinal * 3 + 2,
            },
        }
    }

    /// Iterate over `start..=end` in steps of one period.
    pub fn range_inclusive(start: Self, end: Self) -> impl Iterator<Item = Self> {
        let frequency = start.frequency;
        (start.ordinal..=end.ordinal).map(move |ordinal| Self { frequency, ordinal })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frequency {
            Frequency::Quarterly => write!(f, "{}Q{}", self.year(), self.sub_period()),
            Frequency::Monthly => write!(f, "{}-{:02}", self.year(), self.sub_period()),
        }
    }
}

impl FromStr for Period {
    type Err = FireError;

    /// Parses `1990Q1` / `1990q1` as quarters and `1990-01` as months.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FireError::InvalidPeriod(s.to_string());
        let trimmed = s.trim();

        if let Some((year, q)) = trimmed.split_once(['Q', 'q']) {
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let q = q.parse::<u32>().map_err(|_| invalid())?;
            return Self::quarter(year, q).map_err(|_| invalid());
        }
        if let Some((year, m)) = trimmed.split_once('-') {
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let m = m.parse::<u32>().map_err(|_| invalid())?;
            return Self::month(year, m).map_err(|_| invalid());
        }
        Err(invalid())
    }
}
