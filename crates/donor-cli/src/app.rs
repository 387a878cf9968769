//! Screen loop for the terminal front-end.

use std::{
  io::{BufRead, Write},
  sync::Arc,
};

use anyhow::Result;
use donor_core::{
  declaration::{DECLARATION_TEXT, DeclarationField},
  form::DonorField,
  gateway::Gateway,
  record::{CivilStatus, Sex},
};
use donor_intake::{
  IntakeConfig, IntakePipeline, IntakeState, Notice, NoticeKind, Step,
  account::{Account, LOGGED_IN},
  profile::NO_PROFILE,
  registration::{REGISTERED, RegistrationFlow},
};
use strum::IntoEnumIterator;
use tracing::warn;

use crate::prompt::Prompt;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Register,
  Dashboard,
  /// The intake pipeline: interview, declaration, submission.
  Donate,
  Profile,
  Exit,
}

/// Whether a sub-step keeps the current screen.
enum Next {
  Stay,
  Leave(Screen),
}

// ─── App ──────────────────────────────────────────────────────────────────────

pub struct App<G, R, W> {
  gateway:           Arc<G>,
  config:            IntakeConfig,
  account:           Account<G>,
  pub(crate) prompt: Prompt<R, W>,
}

impl<G: Gateway, R: BufRead, W: Write> App<G, R, W> {
  pub fn new(gateway: Arc<G>, config: IntakeConfig, prompt: Prompt<R, W>) -> Self {
    Self {
      account: Account::new(gateway.clone(), config.clone()),
      gateway,
      config,
      prompt,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut screen = Screen::Login;
    while screen != Screen::Exit {
      screen = match screen {
        Screen::Login => self.login().await?,
        Screen::Register => self.register().await?,
        Screen::Dashboard => self.dashboard().await?,
        Screen::Donate => self.donate().await?,
        Screen::Profile => self.profile().await?,
        Screen::Exit => Screen::Exit,
      };
    }
    Ok(())
  }

  // ── Screens ───────────────────────────────────────────────────────────────

  async fn login(&mut self) -> Result<Screen> {
    self.prompt.say("\n== Blood Donor ==")?;
    let Some(choice) = self.prompt.choose("", &["Log in", "Register", "Quit"])? else {
      return Ok(Screen::Exit);
    };
    match choice {
      0 => {}
      1 => return Ok(Screen::Register),
      _ => return Ok(Screen::Exit),
    }

    let Some(email) = self.prompt.ask("Email")? else {
      return Ok(Screen::Exit);
    };
    let Some(password) = self.prompt.ask("Password")? else {
      return Ok(Screen::Exit);
    };
    match self.account.login(&email, &password).await {
      Ok(_) => {
        self.prompt.notice(&Notice::success("Success", LOGGED_IN))?;
        Ok(Screen::Dashboard)
      }
      Err(e) => {
        self.prompt.notice(&e.notice())?;
        Ok(Screen::Login)
      }
    }
  }

  async fn register(&mut self) -> Result<Screen> {
    self.prompt.say("\n== Register ==")?;
    let mut flow = RegistrationFlow::new(self.gateway.clone(), self.config.clone());
    loop {
      for field in DonorField::all() {
        let current = flow.form().record.field_value(field);
        let Some(value) = self.ask_field(field, &current)? else {
          return Ok(Screen::Exit);
        };
        if let Err(e) = flow.set_field(field, &value) {
          self.prompt.notice(&e.notice())?;
        }
      }
      let Some(password) = self.prompt.ask("Password")? else {
        return Ok(Screen::Exit);
      };
      let Some(confirm) = self.prompt.ask("Confirm Password")? else {
        return Ok(Screen::Exit);
      };
      flow.set_password(&password);
      flow.set_confirm_password(&confirm);

      match flow.submit().await {
        Ok(_) => {
          self.prompt.notice(&Notice::success("Success", REGISTERED))?;
          return Ok(Screen::Login);
        }
        Err(e) => {
          self.prompt.notice(&e.notice())?;
          match self.prompt.confirm("Try again?")? {
            Some(true) => continue,
            Some(false) => return Ok(Screen::Login),
            None => return Ok(Screen::Exit),
          }
        }
      }
    }
  }

  async fn dashboard(&mut self) -> Result<Screen> {
    self.prompt.say("\n== Dashboard ==")?;
    let options = ["Start donation", "View profile", "Log out", "Quit"];
    let Some(choice) = self.prompt.choose("", &options)? else {
      return Ok(Screen::Exit);
    };
    Ok(match choice {
      0 => Screen::Donate,
      1 => Screen::Profile,
      2 => match self.account.logout().await {
        Ok(()) => Screen::Login,
        Err(e) => {
          self.prompt.notice(&e.notice())?;
          Screen::Dashboard
        }
      },
      _ => Screen::Exit,
    })
  }

  async fn profile(&mut self) -> Result<Screen> {
    self.prompt.say("\n== Donor Profile ==")?;
    match self.account.profile().await {
      Ok(Some(view)) => {
        for section in view.sections() {
          self.prompt.say(format!("\n{}", section.title))?;
          for (label, value) in section.entries {
            self.prompt.say(format!("  {label}: {value}"))?;
          }
        }
      }
      Ok(None) => self.prompt.say(NO_PROFILE)?,
      Err(e) => self.prompt.notice(&e.notice())?,
    }
    Ok(Screen::Dashboard)
  }

  async fn donate(&mut self) -> Result<Screen> {
    let mut pipeline = IntakePipeline::new(self.gateway.clone(), self.config.clone());
    let step = pipeline.open(Some(self.account.profile_filter())).await;
    self.show(&step)?;

    loop {
      match pipeline.state() {
        IntakeState::Editing => {
          self.prompt.say("\n== Donor Interview ==  (* required, Enter keeps, - clears)")?;
          for field in DonorField::all() {
            let current = pipeline.form().value(field);
            let Some(value) = self.ask_field(field, &current)? else {
              return Ok(Screen::Exit);
            };
            if value != current {
              let step = pipeline.set_field(field, value).await;
              self.show(&step)?;
            }
          }
          let step = pipeline.submit_interview().await;
          self.show(&step)?;
          if pipeline.state() == IntakeState::Editing {
            match self.prompt.confirm("Edit the form again?")? {
              Some(true) => {}
              Some(false) => return Ok(Screen::Dashboard),
              None => return Ok(Screen::Exit),
            }
          }
        }

        IntakeState::AwaitingDeclaration => {
          if let Next::Leave(screen) = self.declaration(&mut pipeline).await? {
            return Ok(screen);
          }
        }

        IntakeState::Done => return Ok(Screen::Dashboard),
        IntakeState::Failed => return Ok(Screen::Dashboard),

        state @ (IntakeState::Loading | IntakeState::Submitting) => {
          warn!(state = state.as_str(), "intake left busy");
          return Ok(Screen::Dashboard);
        }
      }
    }
  }

  /// One pass over the declaration step.
  async fn declaration(&mut self, pipeline: &mut IntakePipeline<G>) -> Result<Next> {
    self.prompt.say("\n== Declaration ==")?;
    if let Some(ids) = pipeline.identifiers() {
      self.prompt.say(format!("PRC Donor No.:      {}", ids.registry_number))?;
      self.prompt.say(format!("DOH NNBNets Barcode: {}", ids.lab_barcode))?;
    }
    for paragraph in DECLARATION_TEXT {
      self.prompt.say(format!("\n{paragraph}"))?;
    }
    self.prompt.say("")?;

    for field in [DeclarationField::DonorSignature, DeclarationField::GuardianSignature] {
      let current = pipeline.declaration().value(field).to_string();
      let Some(value) = self.prompt.ask_default(field.label(), &current)? else {
        return Ok(Next::Leave(Screen::Exit));
      };
      pipeline.set_declaration(field, value).await;
    }
    let field = DeclarationField::Relationship;
    if pipeline.declaration().has_guardian_signature() {
      let current = pipeline.declaration().value(field).to_string();
      let Some(value) = self.prompt.ask_default(field.label(), &current)? else {
        return Ok(Next::Leave(Screen::Exit));
      };
      pipeline.set_declaration(field, value).await;
    } else if !pipeline.declaration().value(field).is_empty() {
      // No guardian, so no relationship to record.
      pipeline.set_declaration(field, "").await;
    }

    let step = pipeline.submit_declaration().await;
    if pipeline.awaiting_confirmation() {
      let question = step.notice.map(|n| n.message).unwrap_or_default();
      let Some(yes) = self.prompt.confirm(&question)? else {
        return Ok(Next::Leave(Screen::Exit));
      };
      let step = pipeline.confirm(yes).await;
      self.show(&step)?;
      if yes {
        // Done, Failed, or a resumable error; the caller's loop decides.
        return Ok(Next::Stay);
      }
    } else {
      self.show(&step)?;
    }

    match self.prompt.choose(
      "",
      &["Edit declaration", "Back to interview", "Cancel donation"],
    )? {
      None => Ok(Next::Leave(Screen::Exit)),
      Some(0) => Ok(Next::Stay),
      Some(1) => {
        pipeline.back_to_interview().await;
        Ok(Next::Stay)
      }
      Some(_) => Ok(Next::Leave(Screen::Dashboard)),
    }
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn ask_field(&mut self, field: DonorField, current: &str) -> Result<Option<String>> {
    let label = if field.is_required() {
      format!("{}*", field.label())
    } else {
      field.label().to_string()
    };
    let answer = match field {
      DonorField::Sex => {
        let options: Vec<String> = Sex::iter()
          .filter(|s| s.is_selected())
          .map(|s| s.to_string())
          .collect();
        self.pick(&label, &options, current)?
      }
      DonorField::CivilStatus => {
        let options: Vec<String> = CivilStatus::iter()
          .filter(|c| c.is_selected())
          .map(|c| c.to_string())
          .collect();
        self.pick(&label, &options, current)?
      }
      DonorField::Birthdate => {
        self
          .prompt
          .ask_default(&format!("{label} (MM/DD/YYYY)"), current)?
      }
      _ => self.prompt.ask_default(&label, current)?,
    };
    Ok(answer)
  }

  /// A menu whose Enter keeps the current value when it is one of the options.
  fn pick(&mut self, label: &str, options: &[String], current: &str) -> Result<Option<String>> {
    if options.iter().any(|o| o == current) {
      let Some(answer) = self.prompt.ask_default(
        &format!("{label} ({})", options.join("/")),
        current,
      )?
      else {
        return Ok(None);
      };
      return Ok(Some(answer));
    }
    let refs: Vec<&str> = options.iter().map(String::as_str).collect();
    Ok(self.prompt.choose(label, &refs)?.map(|i| options[i].clone()))
  }

  fn show(&mut self, step: &Step) -> Result<()> {
    if let Some(notice) = &step.notice {
      if notice.kind != NoticeKind::Confirm {
        self.prompt.notice(notice)?;
      }
    }
    Ok(())
  }
}
