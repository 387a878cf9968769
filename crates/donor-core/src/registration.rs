//! Registration form: donor details plus account credentials.

use std::fmt;

use chrono::NaiveDate;

use crate::{Result, form::DonorField, record::DonorRecord};

#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationForm {
  pub record:           DonorRecord,
  pub password:         String,
  pub confirm_password: String,
}

impl RegistrationForm {
  pub fn new(today: NaiveDate) -> Self {
    Self {
      record:           DonorRecord::blank(today),
      password:         String::new(),
      confirm_password: String::new(),
    }
  }

  pub fn set(&mut self, field: DonorField, value: &str) -> Result<()> {
    self.record.set_field(field, value)
  }

  pub fn clear(&mut self, today: NaiveDate) { *self = Self::new(today); }
}

// Credentials never reach logs.
impl fmt::Debug for RegistrationForm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RegistrationForm")
      .field("record", &self.record)
      .field("password", &"<redacted>")
      .field("confirm_password", &"<redacted>")
      .finish()
  }
}
