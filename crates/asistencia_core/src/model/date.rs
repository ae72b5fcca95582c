//! Calendar date helpers shared by the store and the calendar view.
//!
//! Dates cross every boundary (SQLite, FFI, CLI) as `YYYY-MM-DD` text and
//! months as `YYYY-MM`.

use chrono::{Datelike, Months, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    InvalidDate(String),
    InvalidMonth(String),
}

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`; expected YYYY-MM-DD"),
            Self::InvalidMonth(value) => write!(f, "invalid month `{value}`; expected YYYY-MM"),
        }
    }
}

impl Error for DateParseError {}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| DateParseError::InvalidDate(trimmed.to_string()))
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month_key(raw: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = raw.trim();
    let invalid = || DateParseError::InvalidMonth(trimmed.to_string());
    let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Returns the first and last day of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).unwrap_or(day);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}
