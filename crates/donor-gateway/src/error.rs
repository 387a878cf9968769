use thiserror::Error;

/// Failure to set up the gateway. Call failures are
/// [`GatewayError`](donor_core::gateway::GatewayError)s.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid base URL: {0}")]
  InvalidBaseUrl(String),

  #[error("API key is empty")]
  MissingApiKey,

  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
