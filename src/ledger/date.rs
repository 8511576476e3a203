//! Bikram Sambat calendar dates.
//!
//! Conversion to and from Gregorian dates happens elsewhere; here a BS date is
//! only range-checked (month 1-12, day 1-32). Per-month day limits vary by
//! year and are validated by the calendar utilities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MAX_BS_DAY: u8 = 32;

/// A Bikram Sambat date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BsDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl BsDate {
    /// Build a date, rejecting out-of-range months and days.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, String> {
        let date = Self { year, month, day };
        date.validate()?;
        Ok(date)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(1..=12).contains(&self.month) {
            return Err(format!("BS month {} is outside 1-12", self.month));
        }
        if !(1..=MAX_BS_DAY).contains(&self.day) {
            return Err(format!("BS day {} is outside 1-{}", self.day, MAX_BS_DAY));
        }
        Ok(())
    }
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for BsDate {
    type Err = String;

    /// Parses `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '-');
        let mut next = |name: &str| {
            parts
                .next()
                .ok_or_else(|| format!("missing {} in BS date '{}'", name, s))
        };
        let year = next("year")?;
        let month = next("month")?;
        let day = next("day")?;

        let year = year
            .parse::<u16>()
            .map_err(|e| format!("bad BS year '{}': {}", year, e))?;
        let month = month
            .parse::<u8>()
            .map_err(|e| format!("bad BS month '{}': {}", month, e))?;
        let day = day
            .parse::<u8>()
            .map_err(|e| format!("bad BS day '{}': {}", day, e))?;

        Self::new(year, month, day)
    }
}
