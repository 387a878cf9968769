//! Intake behaviour settings.

use std::time::Duration;

use serde::Deserialize;

/// When the registry number and lab barcode are (re)generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierPolicy {
  /// Generate on the first completed interview and reuse them for the rest
  /// of the session.
  #[default]
  PerSession,
  /// Generate fresh identifiers on every completed interview.
  PerCompletion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
  pub identifier_policy:      IdentifierPolicy,
  /// Block the interview step until at least one ID number is entered.
  /// Registration always applies this check; the interview only on opt-in.
  pub require_identification: bool,
  /// Deadline for each gateway call.
  pub gateway_timeout:        Duration,
}

impl Default for IntakeConfig {
  fn default() -> Self {
    Self {
      identifier_policy:      IdentifierPolicy::default(),
      require_identification: false,
      gateway_timeout:        Duration::from_secs(30),
    }
  }
}
