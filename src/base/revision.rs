//! Revision dates.
//!
//! A revision date is exactly ten characters, `YYYY-MM-DD`, and must name a
//! real calendar day. Lexicographic order on the canonical form equals
//! chronological order, so [`RevisionDate`] derives its `Ord` from the text.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::error::{Error, Result};

/// A validated `YYYY-MM-DD` revision date.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevisionDate(SmolStr);

impl RevisionDate {
    /// Validates and wraps a date string.
    pub fn new(date: &str) -> Result<Self> {
        check_date(date)?;
        Ok(Self(SmolStr::new(date)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for RevisionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevisionDate({})", self.0)
    }
}

impl fmt::Display for RevisionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RevisionDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for RevisionDate {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

fn check_date(date: &str) -> Result<()> {
    let bytes = date.as_bytes();
    if bytes.len() != 10 {
        return Err(invalid(date, "expected YYYY-MM-DD"));
    }
    for (i, &b) in bytes.iter().enumerate() {
        let ok = if i == 4 || i == 7 {
            b == b'-'
        } else {
            b.is_ascii_digit()
        };
        if !ok {
            return Err(invalid(date, "expected YYYY-MM-DD"));
        }
    }

    let year: u16 = date[0..4].parse().unwrap_or(0);
    let month: u8 = date[5..7].parse().unwrap_or(0);
    let day: u8 = date[8..10].parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return Err(invalid(date, "month out of range"));
    }
    if !(1..=days_in_month(year, month)).contains(&day) {
        return Err(invalid(date, "not a calendar day"));
    }
    Ok(())
}

fn invalid(date: &str, why: &str) -> Error {
    Error::InvalidSyntax(format!("invalid revision date \"{date}\": {why}"))
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Moves the newest revision to the front of the list.
///
/// The newest entry is swapped with the current head; no other entries move.
/// The head of a non-empty list is therefore always the module's current
/// revision.
pub fn sort_revisions(revisions: &mut [RevisionDate]) {
    if revisions.is_empty() {
        return;
    }
    let mut newest = 0;
    for i in 1..revisions.len() {
        if revisions[i] > revisions[newest] {
            newest = i;
        }
    }
    revisions.swap(0, newest);
}
