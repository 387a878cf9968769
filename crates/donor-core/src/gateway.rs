//! The `Gateway` trait: the remote authentication and storage service.
//!
//! Implemented by `donor-gateway` over HTTP and by in-memory fakes in tests.
//! The intake flows depend on this abstraction, never on a concrete client,
//! and receive it explicitly rather than through a global.

use std::{fmt, future::Future};

use thiserror::Error;

use crate::row::{DonorProfile, Row};

/// Opaque user identifier issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A signed-in user.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
  pub user_id:      UserId,
  pub email:        String,
  pub access_token: String,
}

impl fmt::Debug for AuthSession {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AuthSession")
      .field("user_id", &self.user_id)
      .field("email", &self.email)
      .field("access_token", &"<redacted>")
      .finish()
  }
}

/// Which `donors_detail` row to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileFilter {
  /// Whatever row the backend's row-level policy exposes to the signed-in
  /// user.
  CurrentUser,
  UserId(UserId),
  Email(String),
}

/// A failed gateway call. Messages are the backend's own wording and are
/// shown to the user unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
  /// Credentials rejected, account exists, session expired.
  #[error("{0}")]
  Auth(String),

  /// The backend refused a read or write (constraint violation, policy).
  #[error("{0}")]
  Rejected(String),

  /// The request never got a usable response.
  #[error("{0}")]
  Transport(String),

  #[error("network timeout")]
  Timeout,

  /// Anything else. `None` when there is no message fit for the user.
  #[error("{}", .0.as_deref().unwrap_or("unexpected gateway error"))]
  Unexpected(Option<String>),
}

/// Abstraction over the remote backend.
///
/// Every call is a single request/response. Nothing is retried, paginated or
/// batched, and each call may fail independently.
pub trait Gateway: Send + Sync {
  /// Sign in with email and password.
  fn authenticate(
    &self,
    email: &str,
    password: &str,
  ) -> impl Future<Output = Result<AuthSession, GatewayError>> + Send;

  /// Create an account and return its user id.
  fn register(
    &self,
    email: &str,
    password: &str,
  ) -> impl Future<Output = Result<UserId, GatewayError>> + Send;

  /// Fetch a donor profile. `Ok(None)` when no row matches.
  fn fetch_profile(
    &self,
    filter: ProfileFilter,
  ) -> impl Future<Output = Result<Option<DonorProfile>, GatewayError>> + Send;

  /// Insert one row into the row's table.
  fn insert(&self, row: Row) -> impl Future<Output = Result<(), GatewayError>> + Send;

  /// End the current session.
  fn sign_out(&self) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
