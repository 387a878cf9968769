//! Account registration: sign-up followed by the `donors_detail` insert.

use std::sync::Arc;

use donor_core::{
  date::today,
  form::DonorField,
  gateway::{Gateway, UserId},
  registration::RegistrationForm,
  row::{DonorDetailRow, Row},
  validate::validate_registration,
};
use tracing::{info, warn};

use crate::{Result, config::IntakeConfig, error::IntakeError, with_timeout};

pub const REGISTERED: &str = "Registration successful!";
pub const MISSING_USER_ID: &str = "User ID not found after registration";

pub struct RegistrationFlow<G> {
  gateway: Arc<G>,
  config:  IntakeConfig,
  form:    RegistrationForm,
}

impl<G: Gateway> RegistrationFlow<G> {
  pub fn new(gateway: Arc<G>, config: IntakeConfig) -> Self {
    Self {
      gateway,
      config,
      form: RegistrationForm::new(today()),
    }
  }

  pub fn form(&self) -> &RegistrationForm { &self.form }

  pub fn set_field(&mut self, field: DonorField, value: &str) -> Result<()> {
    Ok(self.form.set(field, value)?)
  }

  pub fn set_password(&mut self, password: &str) {
    self.form.password = password.to_string();
  }

  pub fn set_confirm_password(&mut self, password: &str) {
    self.form.confirm_password = password.to_string();
  }

  /// Validate, create the account, then store the donor details under the
  /// new user id. The form is cleared only when both calls succeed; on any
  /// failure the entered values stay for a retry.
  pub async fn submit(&mut self) -> Result<UserId> {
    validate_registration(&self.form)?;

    let limit = self.config.gateway_timeout;
    let email = self.form.record.email.trim().to_string();

    let user_id = with_timeout(limit, self.gateway.register(&email, &self.form.password))
      .await
      .inspect_err(|e| warn!(error = %e, "sign-up failed"))?;
    if user_id.0.trim().is_empty() {
      return Err(IntakeError::Unexpected(Some(MISSING_USER_ID.into())));
    }

    let row = DonorDetailRow::new(user_id.0.clone(), &self.form.record, today())?;
    with_timeout(limit, self.gateway.insert(Row::DonorDetail(row)))
      .await
      .map_err(|e| {
        warn!(user_id = %user_id, error = %e, "donor details insert failed");
        match IntakeError::from(e) {
          // The account exists by now; a rejected insert is a storage error.
          IntakeError::Auth(msg) => IntakeError::Persistence(msg),
          other => other,
        }
      })?;

    info!(user_id = %user_id, "donor registered");
    self.form.clear(today());
    Ok(user_id)
  }
}
