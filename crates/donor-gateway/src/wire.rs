//! Request and response bodies of the auth API, and the error body shared by
//! both APIs.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use donor_core::gateway::GatewayError;

/// PostgREST: a single-object request matched no rows.
pub const NO_ROWS: &str = "PGRST116";

#[derive(Serialize)]
pub struct Credentials<'a> {
  pub email:    &'a str,
  pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct User {
  pub id:    String,
  #[serde(default)]
  pub email: Option<String>,
}

/// `POST /auth/v1/token?grant_type=password`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub user:         User,
}

/// `POST /auth/v1/signup`. With email confirmation on, the body is the bare
/// user; otherwise it is a session wrapping the user.
#[derive(Debug, Default, Deserialize)]
pub struct SignUpResponse {
  #[serde(default)]
  pub id:           Option<String>,
  #[serde(default)]
  pub user:         Option<User>,
  #[serde(default)]
  pub access_token: Option<String>,
}

impl SignUpResponse {
  pub fn user_id(&self) -> Option<&str> {
    self
      .user
      .as_ref()
      .map(|u| u.id.as_str())
      .or(self.id.as_deref())
      .filter(|id| !id.is_empty())
  }
}

/// Error bodies differ between the auth server and PostgREST; take whichever
/// message field is present.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
  #[serde(default)]
  pub msg:               Option<String>,
  #[serde(default)]
  pub message:           Option<String>,
  #[serde(default)]
  pub error_description: Option<String>,
  #[serde(default)]
  pub error:             Option<String>,
  #[serde(default)]
  pub code:              Option<serde_json::Value>,
}

impl ErrorBody {
  pub fn parse(body: &str) -> Self { serde_json::from_str(body).unwrap_or_default() }

  pub fn message(&self) -> Option<&str> {
    [&self.msg, &self.message, &self.error_description, &self.error]
      .into_iter()
      .find_map(|m| m.as_deref())
      .filter(|m| !m.trim().is_empty())
  }

  /// The code as text; the auth server sends numbers, PostgREST strings.
  pub fn code(&self) -> Option<String> {
    match self.code.as_ref()? {
      serde_json::Value::String(s) => Some(s.clone()),
      other => Some(other.to_string()),
    }
  }
}

/// Which API a failed call went to. Client errors from the auth API are
/// credential problems; from the table API they are refusals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
  Auth,
  Rest,
}

/// Map a non-success response onto a [`GatewayError`], keeping the server's
/// own message when it sent one.
pub fn classify(api: Api, status: StatusCode, body: &str) -> GatewayError {
  let parsed = ErrorBody::parse(body);
  let message = parsed
    .message()
    .map(str::to_string)
    .unwrap_or_else(|| format!("request failed with status {status}"));

  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Auth(message),
    s if s.is_client_error() => match api {
      Api::Auth => GatewayError::Auth(message),
      Api::Rest => GatewayError::Rejected(message),
    },
    s if s.is_server_error() => GatewayError::Transport(message),
    _ => GatewayError::Unexpected(parsed.message().map(str::to_string)),
  }
}
