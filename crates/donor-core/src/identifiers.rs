//! Registry number and lab barcode generation.
//!
//! Both identifiers are a date stamp plus a five-digit random suffix drawn
//! uniformly from `10000..=99999`:
//!
//! | Identifier | Format |
//! |------------|--------|
//! | Registry number | `PRC-YYYY-NNNNN` |
//! | Lab barcode | `DOH-YYYYMMDD-NNNNN` |

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::date::today;

pub const SUFFIX_MIN: u32 = 10_000;
pub const SUFFIX_MAX: u32 = 99_999;

/// The pair of tracking codes attached to a completed interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedIdentifiers {
  pub registry_number: String,
  pub lab_barcode:     String,
}

impl GeneratedIdentifiers {
  /// Generate both codes for today's date.
  pub fn generate() -> Self {
    Self::generate_with(today(), &mut rand::thread_rng())
  }

  pub fn generate_with<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> Self {
    Self {
      registry_number: registry_number_with(date, rng),
      lab_barcode:     lab_barcode_with(date, rng),
    }
  }
}

pub fn generate_registry_number() -> String {
  registry_number_with(today(), &mut rand::thread_rng())
}

pub fn generate_lab_barcode() -> String {
  lab_barcode_with(today(), &mut rand::thread_rng())
}

/// `PRC-<year>-<suffix>`
pub fn registry_number_with<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
  format!("PRC-{:04}-{}", date.year(), suffix(rng))
}

/// `DOH-<year><month><day>-<suffix>`
pub fn lab_barcode_with<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
  format!("DOH-{}-{}", date.format("%Y%m%d"), suffix(rng))
}

fn suffix<R: Rng + ?Sized>(rng: &mut R) -> u32 {
  rng.gen_range(SUFFIX_MIN..=SUFFIX_MAX)
}
