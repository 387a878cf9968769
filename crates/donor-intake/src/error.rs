//! Intake error taxonomy and user-facing notices.

use donor_core::{gateway::GatewayError, validate::ValidationErrors};
use thiserror::Error;

/// Fallback text when an error carries nothing fit to show.
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
  /// User-correctable; blocks the transition.
  #[error("{0}")]
  Validation(#[from] ValidationErrors),

  /// Credential rejection, shown verbatim.
  #[error("{0}")]
  Auth(String),

  /// A fetch or insert failed, shown verbatim. The step can be retried.
  #[error("{0}")]
  Persistence(String),

  #[error("network timeout")]
  Timeout,

  #[error("{}", .0.as_deref().unwrap_or(GENERIC_MESSAGE))]
  Unexpected(Option<String>),
}

impl IntakeError {
  /// Whether the user can retry the same step without re-entering data.
  pub fn is_resumable(&self) -> bool { !matches!(self, Self::Unexpected(_)) }

  /// Title for the notice shown to the user.
  pub fn title(&self) -> &'static str {
    match self {
      Self::Validation(_) => "Missing Information",
      Self::Auth(_) => "Authentication Failed",
      Self::Persistence(_) | Self::Timeout => "Error",
      Self::Unexpected(_) => "Unexpected Error",
    }
  }

  pub fn notice(&self) -> Notice { Notice::error(self.title(), self.to_string()) }
}

impl From<GatewayError> for IntakeError {
  fn from(e: GatewayError) -> Self {
    match e {
      GatewayError::Auth(msg) => Self::Auth(msg),
      GatewayError::Rejected(msg) | GatewayError::Transport(msg) => {
        Self::Persistence(msg)
      }
      GatewayError::Timeout => Self::Timeout,
      GatewayError::Unexpected(msg) => Self::Unexpected(msg),
    }
  }
}

impl From<donor_core::Error> for IntakeError {
  fn from(e: donor_core::Error) -> Self { Self::Unexpected(Some(e.to_string())) }
}

pub type Result<T, E = IntakeError> = std::result::Result<T, E>;

// ─── Notices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
  Info,
  Success,
  Error,
  /// A yes/no question; answer with a confirmation event.
  Confirm,
}

/// A message for the user, independent of how the front-end shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub kind:    NoticeKind,
  pub title:   String,
  pub message: String,
}

impl Notice {
  pub fn new(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      kind,
      title: title.into(),
      message: message.into(),
    }
  }

  pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(NoticeKind::Error, title, message)
  }

  pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(NoticeKind::Success, title, message)
  }
}
