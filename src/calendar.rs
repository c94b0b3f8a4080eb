//! Calendar arithmetic for month-keyed source tables.
//!
//! Leap years follow the simplified "divisible by 4" rule throughout. The
//! source tables span 2001 onwards, where it agrees with the full Gregorian
//! rule until 2100.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::TeaError;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month, e.g. `Jan 2015`.
///
/// Ordering is chronological (year first, then month).
///
/// # Examples
///
/// ```
/// use dc_tea::calendar::MonthLabel;
///
/// let feb: MonthLabel = "Feb2016".parse().unwrap();
/// assert_eq!(feb.days(), 29);
/// assert_eq!(feb.to_string(), "Feb 2016");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthLabel {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1 to 12.
    pub month: u8,
}

impl MonthLabel {
    /// Creates a label, checking that `month` is in `1..=12`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `month` is out of range.
    pub fn new(year: i32, month: u8) -> Result<Self, TeaError> {
        if !(1..=12).contains(&month) {
            return Err(TeaError::invalid(
                "month",
                format!("month number must be in 1..=12, got {month}"),
            ));
        }
        Ok(Self { year, month })
    }

    /// Number of days in this month.
    pub fn days(&self) -> usize {
        match self.month {
            2 if is_leap_year(self.year) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// The month after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abbr = MONTH_ABBREVIATIONS[usize::from(self.month - 1)];
        write!(f, "{abbr} {}", self.year)
    }
}

impl FromStr for MonthLabel {
    type Err = TeaError;

    /// Parses `"Jan2015"` or `"Jan 2015"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || {
            TeaError::invalid(
                "month",
                format!("expected a label like \"Jan2015\" or \"Jan 2015\", got \"{s}\""),
            )
        };

        let abbr = s.get(..3).ok_or_else(bad)?;
        let month = MONTH_ABBREVIATIONS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(abbr))
            .ok_or_else(bad)?;

        let year_text = s[3..].trim();
        if year_text.len() != 4 {
            return Err(bad());
        }
        let year = year_text.parse::<i32>().map_err(|_| bad())?;

        // position() is < 12
        Ok(Self {
            year,
            month: month as u8 + 1,
        })
    }
}

impl Serialize for MonthLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether `year` is a leap year under the divisible-by-4 rule.
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0
}

/// Number of days in `year`.
pub fn days_in_year(year: i32) -> usize {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Number of days in the month named by `label` (e.g. `"Feb2016"`).
///
/// # Errors
///
/// Returns `InvalidParameter` if `label` is not a recognisable month label.
pub fn days_in_month(label: &str) -> Result<usize, TeaError> {
    Ok(label.parse::<MonthLabel>()?.days())
}
