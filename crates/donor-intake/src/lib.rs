//! Donor intake flows built on [`donor_core`].
//!
//! - [`machine`]: the pure intake state machine (interview → declaration →
//!   submission).
//! - [`pipeline`]: drives the machine against an injected
//!   [`Gateway`](donor_core::gateway::Gateway).
//! - [`registration`]: account sign-up plus the `donors_detail` insert.
//! - [`account`]: login, logout and the profile view.

pub mod account;
pub mod config;
pub mod error;
pub mod machine;
pub mod pipeline;
pub mod profile;
pub mod registration;

pub use config::{IdentifierPolicy, IntakeConfig};
pub use error::{IntakeError, Notice, NoticeKind, Result};
pub use machine::{Effect, IntakeEvent, IntakeMachine, IntakeState, Step};
pub use pipeline::IntakePipeline;

use std::{future::Future, time::Duration};

use donor_core::gateway::GatewayError;

/// Run a gateway call with a deadline; an elapsed deadline becomes
/// [`GatewayError::Timeout`].
pub(crate) async fn with_timeout<T>(
  limit: Duration,
  call: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
  tokio::time::timeout(limit, call)
    .await
    .unwrap_or(Err(GatewayError::Timeout))
}

#[cfg(test)]
mod fake;
