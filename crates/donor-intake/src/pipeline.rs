//! Async driver for [`IntakeMachine`].
//!
//! Owns the machine and an injected gateway. Each call feeds one user event
//! to the machine, runs any effect it asks for (with the configured
//! deadline), and feeds the outcome back until the machine settles.

use std::sync::Arc;

use donor_core::{
  date::today,
  declaration::{DeclarationField, DeclarationRecord},
  form::{DonorField, InterviewForm},
  gateway::{Gateway, ProfileFilter},
  identifiers::GeneratedIdentifiers,
  record::DonorRecord,
};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::{
  config::IntakeConfig,
  error::IntakeError,
  machine::{Effect, IntakeEvent, IntakeMachine, IntakeState, Step},
  with_timeout,
};

pub struct IntakePipeline<G> {
  gateway:    Arc<G>,
  machine:    IntakeMachine,
  config:     IntakeConfig,
  session_id: Uuid,
}

impl<G: Gateway> IntakePipeline<G> {
  pub fn new(gateway: Arc<G>, config: IntakeConfig) -> Self {
    Self {
      gateway,
      machine: IntakeMachine::new(config.clone(), today()),
      config,
      session_id: Uuid::new_v4(),
    }
  }

  /// Open the interview. A returning donor's profile is fetched first when
  /// `filter` is given.
  pub async fn open(&mut self, filter: Option<ProfileFilter>) -> Step {
    let step = self.machine.start(filter);
    self.settle(step).await
  }

  /// Feed one event and run effects until the machine settles. The returned
  /// step carries the last notice produced along the way.
  pub async fn dispatch(&mut self, event: IntakeEvent) -> Step {
    let step = self.machine.handle(event);
    self.settle(step).await
  }

  async fn settle(&mut self, mut step: Step) -> Step {
    let span = info_span!("intake", session = %self.session_id);
    let mut notice = step.notice.take();
    while let Some(effect) = step.effect.take() {
      let reply = self.run(effect).instrument(span.clone()).await;
      step = self.machine.handle(reply);
      if step.notice.is_some() {
        notice = step.notice.take();
      }
    }
    step.notice = notice;
    step
  }

  async fn run(&self, effect: Effect) -> IntakeEvent {
    let limit = self.config.gateway_timeout;
    match effect {
      Effect::FetchProfile(filter) => {
        debug!("fetching profile");
        IntakeEvent::ProfileLoaded(with_timeout(limit, self.gateway.fetch_profile(filter)).await)
      }
      Effect::Insert(row) => {
        debug!(table = %row.table(), "inserting row");
        IntakeEvent::GatewayResult(with_timeout(limit, self.gateway.insert(row)).await)
      }
    }
  }

  // ── Event shorthands ────────────────────────────────────────────────────

  pub async fn set_field(&mut self, field: DonorField, value: impl Into<String>) -> Step {
    self
      .dispatch(IntakeEvent::FieldChanged {
        field,
        value: value.into(),
      })
      .await
  }

  pub async fn submit_interview(&mut self) -> Step {
    self.dispatch(IntakeEvent::SubmitInterview).await
  }

  pub async fn back_to_interview(&mut self) -> Step {
    self.dispatch(IntakeEvent::BackToInterview).await
  }

  pub async fn set_declaration(
    &mut self,
    field: DeclarationField,
    value: impl Into<String>,
  ) -> Step {
    self
      .dispatch(IntakeEvent::DeclarationChanged {
        field,
        value: value.into(),
      })
      .await
  }

  pub async fn submit_declaration(&mut self) -> Step {
    self.dispatch(IntakeEvent::SubmitDeclaration).await
  }

  pub async fn confirm(&mut self, yes: bool) -> Step {
    self.dispatch(IntakeEvent::ConfirmDeclaration(yes)).await
  }

  // ── Accessors ───────────────────────────────────────────────────────────

  pub fn session_id(&self) -> Uuid { self.session_id }

  pub fn state(&self) -> IntakeState { self.machine.state() }

  pub fn form(&self) -> &InterviewForm { self.machine.form() }

  pub fn frozen_record(&self) -> Option<&DonorRecord> { self.machine.frozen_record() }

  pub fn declaration(&self) -> &DeclarationRecord { self.machine.declaration() }

  pub fn identifiers(&self) -> Option<&GeneratedIdentifiers> { self.machine.identifiers() }

  pub fn awaiting_confirmation(&self) -> bool { self.machine.awaiting_confirmation() }

  pub fn last_error(&self) -> Option<&IntakeError> { self.machine.last_error() }
}
