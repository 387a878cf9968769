//! Error types for `donor-core`.

use thiserror::Error;

use crate::form::DonorField;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown sex: {0:?}")]
  UnknownSex(String),

  #[error("unknown civil status: {0:?}")]
  UnknownCivilStatus(String),

  #[error("invalid date {0:?}: expected YYYY-MM-DD or MM/DD/YYYY")]
  InvalidDate(String),

  #[error("invalid age {0:?}: expected a whole number")]
  InvalidAge(String),

  /// A row was built from a record that never passed validation.
  #[error("{} is required", .0.label())]
  MissingField(DonorField),

  #[error("generated identifiers are missing from the record")]
  MissingIdentifiers,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
