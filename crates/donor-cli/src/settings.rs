//! Client settings: `donor.toml`, then `DONOR_*` environment variables, then
//! command-line flags.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use donor_gateway::RestConfig;
use donor_intake::{IdentifierPolicy, IntakeConfig};
use serde::Deserialize;

fn default_timeout_secs() -> u64 { 30 }

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
  /// Backend project URL.
  #[serde(default)]
  pub base_url:               String,
  /// Public API key of the project.
  #[serde(default)]
  pub api_key:                String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:           u64,
  #[serde(default)]
  pub identifier_policy:      IdentifierPolicy,
  #[serde(default)]
  pub require_identification: bool,
}

impl ClientConfig {
  /// Read the optional file at `path` layered with the environment.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DONOR"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;
    Self::from_settings(settings)
  }

  pub fn from_settings(settings: config::Config) -> Result<Self> {
    settings
      .try_deserialize()
      .context("failed to deserialise client config")
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs.max(1)) }

  pub fn rest(&self) -> RestConfig {
    RestConfig {
      base_url: self.base_url.clone(),
      api_key:  self.api_key.clone(),
      timeout:  self.timeout(),
    }
  }

  pub fn intake(&self) -> IntakeConfig {
    IntakeConfig {
      identifier_policy:      self.identifier_policy,
      require_identification: self.require_identification,
      gateway_timeout:        self.timeout(),
    }
  }
}

#[cfg(test)]
mod tests {
  use config::{Config, File, FileFormat};

  use super::*;

  fn parse(toml: &str) -> ClientConfig {
    let settings = Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap();
    ClientConfig::from_settings(settings).unwrap()
  }

  #[test]
  fn defaults_apply_to_missing_keys() {
    let cfg = parse(r#"base_url = "https://xyz.supabase.co""#);
    assert_eq!(cfg.base_url, "https://xyz.supabase.co");
    assert_eq!(cfg.api_key, "");
    assert_eq!(cfg.timeout_secs, 30);
    assert_eq!(cfg.identifier_policy, IdentifierPolicy::PerSession);
    assert!(!cfg.require_identification);
  }

  #[test]
  fn intake_settings_follow_the_file() {
    let cfg = parse(
      r#"
        base_url = "https://xyz.supabase.co"
        api_key = "anon"
        timeout_secs = 5
        identifier_policy = "per_completion"
        require_identification = true
      "#,
    );
    let intake = cfg.intake();
    assert_eq!(intake.identifier_policy, IdentifierPolicy::PerCompletion);
    assert!(intake.require_identification);
    assert_eq!(intake.gateway_timeout, Duration::from_secs(5));
    assert_eq!(cfg.rest().api_key, "anon");
  }
}
