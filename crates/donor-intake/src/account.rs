//! Login, logout and the signed-in donor's profile.

use std::sync::Arc;

use donor_core::{
  date::today,
  gateway::{AuthSession, Gateway, GatewayError, ProfileFilter},
  validate::validate_credentials,
};
use tracing::{info, warn};

use crate::{Result, config::IntakeConfig, error::IntakeError, profile::ProfileView, with_timeout};

pub const LOGGED_IN: &str = "Login successful!";
pub const LOGOUT_FAILED: &str = "Logout failed. Try again.";
pub const PROFILE_FAILED: &str = "Failed to fetch profile information";

pub struct Account<G> {
  gateway: Arc<G>,
  config:  IntakeConfig,
  session: Option<AuthSession>,
}

impl<G: Gateway> Account<G> {
  pub fn new(gateway: Arc<G>, config: IntakeConfig) -> Self {
    Self {
      gateway,
      config,
      session: None,
    }
  }

  pub fn session(&self) -> Option<&AuthSession> { self.session.as_ref() }

  pub fn is_signed_in(&self) -> bool { self.session.is_some() }

  /// Both fields must be non-empty before the gateway is called. A rejection
  /// carries the backend's message unchanged.
  pub async fn login(&mut self, email: &str, password: &str) -> Result<&AuthSession> {
    let email = email.trim();
    validate_credentials(email, password)?;

    let session = with_timeout(
      self.config.gateway_timeout,
      self.gateway.authenticate(email, password),
    )
    .await
    .inspect_err(|e| warn!(error = %e, "login failed"))?;

    info!(user_id = %session.user_id, "signed in");
    Ok(&*self.session.insert(session))
  }

  /// The session is kept when the backend refuses to end it.
  pub async fn logout(&mut self) -> Result<()> {
    match with_timeout(self.config.gateway_timeout, self.gateway.sign_out()).await {
      Ok(()) => {
        if let Some(session) = self.session.take() {
          info!(user_id = %session.user_id, "signed out");
        }
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "logout failed");
        Err(IntakeError::Persistence(LOGOUT_FAILED.into()))
      }
    }
  }

  /// The signed-in donor's `donors_detail` row, looked up by email.
  /// `Ok(None)` when no row exists yet.
  pub async fn profile(&self) -> Result<Option<ProfileView>> {
    let filter = match &self.session {
      Some(session) => ProfileFilter::Email(session.email.clone()),
      None => ProfileFilter::CurrentUser,
    };
    let profile = with_timeout(
      self.config.gateway_timeout,
      self.gateway.fetch_profile(filter),
    )
    .await
    .map_err(|e| {
      warn!(error = %e, "profile fetch failed");
      match e {
        GatewayError::Timeout => IntakeError::Timeout,
        _ => IntakeError::Persistence(PROFILE_FAILED.into()),
      }
    })?;
    Ok(profile.map(|p| ProfileView::new(p, today())))
  }

  /// Filter for prefilling the interview with this donor's stored details.
  pub fn profile_filter(&self) -> ProfileFilter {
    match &self.session {
      Some(session) => ProfileFilter::UserId(session.user_id.clone()),
      None => ProfileFilter::CurrentUser,
    }
  }
}
