//! Core journal functionality without I/O operations.
//!
//! This module contains pure logic for date keys and date selection. It provides
//! the `DateKey` type used to address entries, the `DateSpecifier` enum for
//! resolving which page the user wants, and the quote-of-the-day lookup shown
//! alongside an entry.

use crate::constants::{DATE_FORMAT_COMPACT, DATE_FORMAT_ISO};
use crate::errors::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The canonical `YYYY-MM-DD` key of a journal entry.
///
/// A `DateKey` can only be built from a real calendar date written in canonical
/// form, so lexicographic order on keys is chronological order. The store relies
/// on this for its newest-first listing.
///
/// # Examples
///
/// ```
/// use soulpages::journal_core::DateKey;
///
/// let key = DateKey::parse("2024-03-01").unwrap();
/// assert_eq!(key.as_str(), "2024-03-01");
///
/// assert!(DateKey::parse("2024-3-1").is_err());
/// assert!(DateKey::parse("2024-02-30").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(String);

impl DateKey {
    /// Parses a canonical `YYYY-MM-DD` key.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidDateKey` if the string is not a valid date or is
    /// not zero-padded canonical form.
    pub fn parse(key: &str) -> Result<Self, StoreError> {
        let date = NaiveDate::parse_from_str(key, DATE_FORMAT_ISO)
            .map_err(|_| StoreError::InvalidDateKey(key.to_string()))?;
        Self::from_date(date)
            .ok()
            .filter(|canonical| canonical.0 == key)
            .ok_or_else(|| StoreError::InvalidDateKey(key.to_string()))
    }

    /// Builds the key for a calendar date.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidDateKey` for years outside 0000-9999, which
    /// have no four-digit canonical form.
    pub fn from_date(date: NaiveDate) -> Result<Self, StoreError> {
        let formatted = date.format(DATE_FORMAT_ISO).to_string();
        if formatted.len() != 10 || formatted.starts_with(|c: char| c == '+' || c == '-') {
            return Err(StoreError::InvalidDateKey(formatted));
        }
        Ok(DateKey(formatted))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DateKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateKey::parse(s)
    }
}

impl TryFrom<String> for DateKey {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DateKey::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

/// Represents which day's page the user asked for.
///
/// # Examples
///
/// ```
/// use soulpages::journal_core::DateSpecifier;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
///
/// let spec = DateSpecifier::from_cli_arg(None).unwrap();
/// assert_eq!(spec.resolve(today).unwrap().as_str(), "2024-05-20");
///
/// let spec = DateSpecifier::from_cli_arg(Some("20240101")).unwrap();
/// assert_eq!(spec.resolve(today).unwrap().as_str(), "2024-01-01");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DateSpecifier {
    /// Today's page, in local time.
    Today,

    /// A specific date's page.
    Specific(NaiveDate),
}

impl DateSpecifier {
    /// Creates a DateSpecifier from the optional `--date` argument.
    ///
    /// # Errors
    ///
    /// Returns `chrono::ParseError` if the date string is in neither `YYYY-MM-DD`
    /// nor `YYYYMMDD` format.
    pub fn from_cli_arg(date_str: Option<&str>) -> Result<Self, chrono::ParseError> {
        match date_str {
            Some(date_str) => Self::parse_date_string(date_str).map(DateSpecifier::Specific),
            None => Ok(DateSpecifier::Today),
        }
    }

    /// Parse a date string in YYYY-MM-DD or YYYYMMDD format
    fn parse_date_string(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(date_str, DATE_FORMAT_ISO)
            .or_else(|_| NaiveDate::parse_from_str(date_str, DATE_FORMAT_COMPACT))
    }

    /// Resolves the specifier to an entry key relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidDateKey` if the date has no canonical key.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateKey, StoreError> {
        match self {
            DateSpecifier::Today => DateKey::from_date(today),
            DateSpecifier::Specific(date) => DateKey::from_date(*date),
        }
    }
}

const QUOTES: &[(&str, &str)] = &[
    ("Be gentle with yourself; you're doing the best you can.", "Unknown"),
    ("Let today be the start of something soft and brave.", "Unknown"),
    ("In the silence, your heart knows the words.", "Unknown"),
    ("Small steps still move you forward.", "Unknown"),
    ("You are a whole sky of feelings. Write them.", "Unknown"),
    ("Healing is not a line; it's a garden.", "Unknown"),
    ("The act of writing is the act of discovering.", "Flannery O'Connor"),
    ("No feeling is final.", "Rainer Maria Rilke"),
    ("What is not expressed gets heavier.", "Unknown"),
    ("Your story matters, especially to you.", "Unknown"),
];

/// Returns the `(quote, author)` pair shown on a given day.
///
/// The choice is deterministic: the year, month and day are summed and taken
/// modulo the number of quotes, so a page always shows the same quote.
pub fn quote_for_date(key: &DateKey) -> (&'static str, &'static str) {
    let sum: usize = key
        .as_str()
        .split('-')
        .filter_map(|part| part.parse::<usize>().ok())
        .sum();
    QUOTES[sum % QUOTES.len()]
}
