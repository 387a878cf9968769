//! The intake state machine.
//!
//! ```text
//! Loading ──► Editing ──► AwaitingDeclaration ──► Submitting ──► Done
//!               ▲  (back)       │   ▲                  │
//!               └───────────────┘   └── gateway error ─┘
//!                                   (resumable)        └─► Failed
//! ```
//!
//! The machine performs no I/O. [`IntakeMachine::handle`] returns a [`Step`]
//! that may carry an [`Effect`] for the caller to run; the effect's outcome
//! comes back as another event. [`crate::IntakePipeline`] does this against a
//! real gateway.

use chrono::{NaiveDate, Utc};
use donor_core::{
  declaration::{DeclarationField, DeclarationRecord},
  form::{DonorField, InterviewForm},
  gateway::{GatewayError, ProfileFilter},
  identifiers::GeneratedIdentifiers,
  record::DonorRecord,
  row::{DonorFormRow, DonorProfile, Row},
  validate::{merge, validate_declaration, validate_identification, validate_interview},
};
use tracing::{debug, error, info, warn};

use crate::{
  config::{IdentifierPolicy, IntakeConfig},
  error::{IntakeError, Notice, NoticeKind},
};

// ─── States, events, effects ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeState {
  /// Fetching a returning donor's profile.
  Loading,
  /// Interview form active.
  Editing,
  /// Interview frozen, declaration form active.
  AwaitingDeclaration,
  /// Insert in flight.
  Submitting,
  Done,
  /// Terminal for this session.
  Failed,
}

impl IntakeState {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Loading => "loading",
      Self::Editing => "editing",
      Self::AwaitingDeclaration => "awaiting_declaration",
      Self::Submitting => "submitting",
      Self::Done => "done",
      Self::Failed => "failed",
    }
  }

  /// A gateway call is outstanding; new triggers are ignored.
  pub fn is_busy(self) -> bool { matches!(self, Self::Loading | Self::Submitting) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeEvent {
  ProfileLoaded(Result<Option<DonorProfile>, GatewayError>),
  FieldChanged { field: DonorField, value: String },
  SubmitInterview,
  BackToInterview,
  DeclarationChanged { field: DeclarationField, value: String },
  SubmitDeclaration,
  /// The user's answer to the submission confirmation.
  ConfirmDeclaration(bool),
  GatewayResult(Result<(), GatewayError>),
}

impl IntakeEvent {
  /// Variant name for logs. Field values stay out of logs.
  pub fn name(&self) -> &'static str {
    match self {
      Self::ProfileLoaded(_) => "profile_loaded",
      Self::FieldChanged { .. } => "field_changed",
      Self::SubmitInterview => "submit_interview",
      Self::BackToInterview => "back_to_interview",
      Self::DeclarationChanged { .. } => "declaration_changed",
      Self::SubmitDeclaration => "submit_declaration",
      Self::ConfirmDeclaration(_) => "confirm_declaration",
      Self::GatewayResult(_) => "gateway_result",
    }
  }
}

/// Work the caller must perform and report back.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
  /// Answer with [`IntakeEvent::ProfileLoaded`].
  FetchProfile(ProfileFilter),
  /// Answer with [`IntakeEvent::GatewayResult`].
  Insert(Row),
}

/// The outcome of one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
  pub effect:  Option<Effect>,
  pub notice:  Option<Notice>,
  /// The event was not valid in the current state and changed nothing.
  pub ignored: bool,
}

impl Step {
  fn ignored() -> Self {
    Self {
      ignored: true,
      ..Self::default()
    }
  }

  fn notice(notice: Notice) -> Self {
    Self {
      notice: Some(notice),
      ..Self::default()
    }
  }

  fn effect(effect: Effect) -> Self {
    Self {
      effect: Some(effect),
      ..Self::default()
    }
  }
}

pub const FETCH_FAILED: &str = "Failed to fetch donor details.";
pub const SUBMITTED: &str = "Donor form submitted successfully!";
pub const CONFIRM_PROMPT: &str =
  "Submit your donor form? It cannot be changed after submission.";

// ─── Machine ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IntakeMachine {
  config:                IntakeConfig,
  today:                 NaiveDate,
  state:                 IntakeState,
  /// `start` has run; `Loading` alone cannot tell "not started" from
  /// "fetch in flight".
  started:               bool,
  form:                  InterviewForm,
  /// By-value copy of the interview, taken when the interview completes.
  frozen:                Option<DonorRecord>,
  declaration:           DeclarationRecord,
  awaiting_confirmation: bool,
  session_identifiers:   Option<GeneratedIdentifiers>,
  last_error:            Option<IntakeError>,
}

impl IntakeMachine {
  pub fn new(config: IntakeConfig, today: NaiveDate) -> Self {
    Self {
      config,
      today,
      state: IntakeState::Loading,
      started: false,
      form: InterviewForm::new(today),
      frozen: None,
      declaration: DeclarationRecord::default(),
      awaiting_confirmation: false,
      session_identifiers: None,
      last_error: None,
    }
  }

  /// Begin the session. With a filter, a profile fetch is requested and the
  /// machine stays `Loading`; without one it goes straight to `Editing`.
  pub fn start(&mut self, filter: Option<ProfileFilter>) -> Step {
    if self.started {
      debug!(state = self.state.as_str(), "already started, start ignored");
      return Step::ignored();
    }
    self.started = true;
    match filter {
      Some(filter) => Step::effect(Effect::FetchProfile(filter)),
      None => {
        self.enter(IntakeState::Editing);
        Step::default()
      }
    }
  }

  // ── Accessors ───────────────────────────────────────────────────────────

  pub fn state(&self) -> IntakeState { self.state }

  pub fn form(&self) -> &InterviewForm { &self.form }

  /// The interview as handed to the declaration step.
  pub fn frozen_record(&self) -> Option<&DonorRecord> { self.frozen.as_ref() }

  pub fn declaration(&self) -> &DeclarationRecord { &self.declaration }

  pub fn identifiers(&self) -> Option<&GeneratedIdentifiers> {
    self.frozen.as_ref().and_then(|r| r.identifiers.as_ref())
  }

  pub fn awaiting_confirmation(&self) -> bool { self.awaiting_confirmation }

  pub fn last_error(&self) -> Option<&IntakeError> { self.last_error.as_ref() }

  // ── Events ──────────────────────────────────────────────────────────────

  pub fn handle(&mut self, event: IntakeEvent) -> Step {
    use IntakeEvent as E;
    use IntakeState as S;

    match (self.state, event) {
      (S::Loading, E::ProfileLoaded(result)) => self.on_profile_loaded(result),

      (S::Editing, E::FieldChanged { field, value }) => {
        match self.form.set(field, &value) {
          Ok(()) => {
            debug!(%field, "field changed");
            Step::default()
          }
          Err(e) => Step::notice(Notice::error("Invalid Value", e.to_string())),
        }
      }
      (S::Editing, E::SubmitInterview) => self.on_submit_interview(),

      (S::AwaitingDeclaration, E::BackToInterview) => {
        self.frozen = None;
        self.awaiting_confirmation = false;
        self.enter(S::Editing);
        Step::default()
      }
      (S::AwaitingDeclaration, E::DeclarationChanged { field, value }) => {
        self.declaration.set(field, &value);
        // An edit invalidates a pending confirmation.
        self.awaiting_confirmation = false;
        debug!(%field, "declaration changed");
        Step::default()
      }
      (S::AwaitingDeclaration, E::SubmitDeclaration) => self.on_submit_declaration(),
      (S::AwaitingDeclaration, E::ConfirmDeclaration(yes)) => self.on_confirm(yes),

      (S::Submitting, E::GatewayResult(result)) => self.on_gateway_result(result),

      (state, event) => {
        if state.is_busy() {
          debug!(state = state.as_str(), event = event.name(), "busy, event ignored");
        } else {
          debug!(
            state = state.as_str(),
            event = event.name(),
            "event not valid in state"
          );
        }
        Step::ignored()
      }
    }
  }

  /// Abort the session after an error outside the normal flow.
  pub fn fail(&mut self, err: IntakeError) -> Step {
    error!(state = self.state.as_str(), error = %err, "intake failed");
    let notice = err.notice();
    self.last_error = Some(err);
    self.frozen = None;
    self.awaiting_confirmation = false;
    self.enter(IntakeState::Failed);
    Step::notice(notice)
  }

  // ── Handlers ────────────────────────────────────────────────────────────

  fn on_profile_loaded(
    &mut self,
    result: Result<Option<DonorProfile>, GatewayError>,
  ) -> Step {
    let step = match result {
      Ok(Some(profile)) => {
        self.form = InterviewForm::from_profile(&profile, self.today);
        Step::default()
      }
      Ok(None) => Step::default(),
      Err(e) => {
        // The form still opens, blank.
        warn!(error = %e, "profile fetch failed");
        Step::notice(Notice::error("Error", FETCH_FAILED))
      }
    };
    self.enter(IntakeState::Editing);
    step
  }

  fn on_submit_interview(&mut self) -> Step {
    let mut result = validate_interview(self.form.record());
    if self.config.require_identification {
      result = merge(result, validate_identification(&self.form.record().identification));
    }
    if let Err(errors) = result {
      let err = IntakeError::from(errors);
      let notice = err.notice();
      self.last_error = Some(err);
      return Step::notice(notice);
    }

    let identifiers = match self.config.identifier_policy {
      IdentifierPolicy::PerSession => self
        .session_identifiers
        .get_or_insert_with(GeneratedIdentifiers::generate)
        .clone(),
      IdentifierPolicy::PerCompletion => {
        let fresh = GeneratedIdentifiers::generate();
        self.session_identifiers = Some(fresh.clone());
        fresh
      }
    };
    debug!(
      registry_number = %identifiers.registry_number,
      lab_barcode = %identifiers.lab_barcode,
      "interview complete"
    );

    let mut frozen = self.form.snapshot();
    frozen.identifiers = Some(identifiers);
    self.frozen = Some(frozen);
    self.declaration = DeclarationRecord::default();
    self.awaiting_confirmation = false;
    self.last_error = None;
    self.enter(IntakeState::AwaitingDeclaration);
    Step::default()
  }

  fn on_submit_declaration(&mut self) -> Step {
    if let Err(errors) = validate_declaration(&self.declaration) {
      let err = IntakeError::from(errors);
      let notice = Notice::error("Error", err.to_string());
      self.last_error = Some(err);
      return Step::notice(notice);
    }
    self.awaiting_confirmation = true;
    Step::notice(Notice::new(
      NoticeKind::Confirm,
      "Confirm Submission",
      CONFIRM_PROMPT,
    ))
  }

  fn on_confirm(&mut self, yes: bool) -> Step {
    if !self.awaiting_confirmation {
      return Step::ignored();
    }
    self.awaiting_confirmation = false;
    if !yes {
      return Step::default();
    }

    let Some(frozen) = self.frozen.as_ref() else {
      return self.fail(IntakeError::Unexpected(None));
    };
    let stamped = self.declaration.stamped(Utc::now());
    match DonorFormRow::new(frozen, &stamped, self.today) {
      Ok(row) => {
        self.declaration = stamped;
        self.enter(IntakeState::Submitting);
        Step::effect(Effect::Insert(Row::DonorForm(row)))
      }
      Err(e) => self.fail(e.into()),
    }
  }

  fn on_gateway_result(&mut self, result: Result<(), GatewayError>) -> Step {
    match result {
      Ok(()) => {
        if let Some(ids) = self.identifiers() {
          info!(registry_number = %ids.registry_number, "donor form submitted");
        }
        // The submitted record is never edited again.
        self.frozen = None;
        self.declaration = DeclarationRecord::default();
        self.session_identifiers = None;
        self.form.reset(self.today);
        self.last_error = None;
        self.enter(IntakeState::Done);
        Step::notice(Notice::success("Success", SUBMITTED))
      }
      Err(e) => {
        let err = IntakeError::from(e);
        if !err.is_resumable() {
          return self.fail(err);
        }
        warn!(error = %err, "donor form submission failed");
        let notice = Notice::error("Error", err.to_string());
        self.declaration.submitted_at = None;
        self.last_error = Some(err);
        self.enter(IntakeState::AwaitingDeclaration);
        Step::notice(notice)
      }
    }
  }

  fn enter(&mut self, next: IntakeState) {
    debug!(from = self.state.as_str(), to = next.as_str(), "intake transition");
    self.state = next;
  }
}
