//! Birthdate parsing and formatting.
//!
//! Dates are stored as `YYYY-MM-DD` and shown to the user as `MM/DD/YYYY`.
//! Input is accepted in either form.

use chrono::{Datelike, Local, NaiveDate};

use crate::{Error, Result};

pub const STORAGE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// Parse a date typed by the user or read from storage.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
  let trimmed = input.trim();
  NaiveDate::parse_from_str(trimmed, STORAGE_FORMAT)
    .or_else(|_| NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT))
    .map_err(|_| Error::InvalidDate(input.to_string()))
}

/// `MM/DD/YYYY`
pub fn display_date(date: NaiveDate) -> String {
  date.format(DISPLAY_FORMAT).to_string()
}

/// `YYYY-MM-DD`
pub fn storage_date(date: NaiveDate) -> String {
  date.format(STORAGE_FORMAT).to_string()
}

/// The local calendar date.
pub fn today() -> NaiveDate { Local::now().date_naive() }

/// Whole years between `birthdate` and `on`. Zero for future birthdates.
pub fn age_on(birthdate: NaiveDate, on: NaiveDate) -> u32 {
  let mut years = on.year() - birthdate.year();
  if (on.month(), on.day()) < (birthdate.month(), birthdate.day()) {
    years -= 1;
  }
  years.max(0) as u32
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn parses_both_formats() {
    assert_eq!(parse_date("1990-04-23").unwrap(), ymd(1990, 4, 23));
    assert_eq!(parse_date("04/23/1990").unwrap(), ymd(1990, 4, 23));
    assert_eq!(parse_date(" 1990-04-23 ").unwrap(), ymd(1990, 4, 23));
  }

  #[test]
  fn rejects_day_first_and_garbage() {
    assert!(matches!(parse_date("23/04/1990"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date("yesterday"), Err(Error::InvalidDate(_))));
    assert!(matches!(parse_date(""), Err(Error::InvalidDate(_))));
  }

  #[test]
  fn formats_for_display_and_storage() {
    let d = ymd(2001, 1, 9);
    assert_eq!(display_date(d), "01/09/2001");
    assert_eq!(storage_date(d), "2001-01-09");
  }

  #[test]
  fn age_counts_completed_years() {
    let born = ymd(2000, 6, 15);
    assert_eq!(age_on(born, ymd(2024, 6, 14)), 23);
    assert_eq!(age_on(born, ymd(2024, 6, 15)), 24);
    assert_eq!(age_on(born, ymd(1999, 1, 1)), 0);
  }
}
