//! Year-less calendar dates as they appear in sheet headers ("12/8", "Inv 09/05").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A month/day pair without a year.
///
/// Ordering is by month, then day. There is no year, so a series that
/// crosses a December to January boundary sorts January first; callers must
/// not mix data from more than one calendar year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    month: u8,
    day: u8,
}

impl MonthDay {
    /// Build a date, rejecting months outside 1..=12 and days outside 1..=31.
    pub fn new(month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(Self {
            month: month as u8,
            day: day as u8,
        })
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Parse a bare `M/D` token (one or two digits on each side, surrounding
    /// whitespace allowed). Anything else returns `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let (month, day) = text.trim().split_once('/')?;
        Self::new(parse_part(month)?, parse_part(day)?)
    }
}

fn parse_part(part: &str) -> Option<u32> {
    let part = part.trim();
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MonthDay::parse(s).ok_or_else(|| format!("expected a month/day date, got '{}'", s))
    }
}

impl Serialize for MonthDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
