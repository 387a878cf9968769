//! Scripted in-memory gateway for tests.

use std::{
  collections::{HashMap, VecDeque},
  sync::Mutex,
  time::Duration,
};

use donor_core::{
  gateway::{AuthSession, Gateway, GatewayError, ProfileFilter, UserId},
  row::{DonorDetailRow, DonorProfile, Row},
};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
  /// email → (password, id)
  users:             HashMap<String, (String, UserId)>,
  current:           Option<UserId>,
  profiles:          Vec<DonorDetailRow>,
  inserted:          Vec<Row>,
  insert_failures:   VecDeque<GatewayError>,
  register_failure:  Option<GatewayError>,
  /// Sign-up succeeds but reports an empty user id.
  blank_user_ids:    bool,
  fetch_failure:     Option<GatewayError>,
  sign_out_failure:  Option<GatewayError>,
  calls:             Vec<&'static str>,
}

#[derive(Default)]
pub struct FakeGateway {
  inner: Mutex<Inner>,
  delay: Duration,
}

impl FakeGateway {
  pub fn new() -> Self { Self::default() }

  /// Every call sleeps this long before answering.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  pub fn with_user(self, email: &str, password: &str) -> Self {
    self.inner.lock().unwrap().users.insert(
      email.to_string(),
      (password.to_string(), UserId(Uuid::new_v4().to_string())),
    );
    self
  }

  pub fn with_profile(self, row: DonorDetailRow) -> Self {
    self.inner.lock().unwrap().profiles.push(row);
    self
  }

  pub fn fail_next_insert(&self, err: GatewayError) {
    self.inner.lock().unwrap().insert_failures.push_back(err);
  }

  pub fn fail_register(&self, err: GatewayError) {
    self.inner.lock().unwrap().register_failure = Some(err);
  }

  pub fn with_blank_user_ids(self) -> Self {
    self.inner.lock().unwrap().blank_user_ids = true;
    self
  }

  pub fn fail_fetch(&self, err: GatewayError) {
    self.inner.lock().unwrap().fetch_failure = Some(err);
  }

  pub fn fail_sign_out(&self, err: GatewayError) {
    self.inner.lock().unwrap().sign_out_failure = Some(err);
  }

  pub fn inserted(&self) -> Vec<Row> { self.inner.lock().unwrap().inserted.clone() }

  pub fn calls(&self) -> Vec<&'static str> { self.inner.lock().unwrap().calls.clone() }

  pub fn user_id(&self, email: &str) -> Option<UserId> {
    self.inner.lock().unwrap().users.get(email).map(|(_, id)| id.clone())
  }

  async fn pause(&self) {
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
  }
}

impl Gateway for FakeGateway {
  async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
    self.pause().await;
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push("authenticate");
    let user_id = match inner.users.get(email) {
      Some((pw, id)) if pw == password => id.clone(),
      _ => return Err(GatewayError::Auth("Invalid login credentials".into())),
    };
    inner.current = Some(user_id.clone());
    Ok(AuthSession {
      user_id,
      email: email.to_string(),
      access_token: "token".into(),
    })
  }

  async fn register(&self, email: &str, password: &str) -> Result<UserId, GatewayError> {
    self.pause().await;
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push("register");
    if let Some(err) = inner.register_failure.take() {
      return Err(err);
    }
    if inner.users.contains_key(email) {
      return Err(GatewayError::Auth("User already registered".into()));
    }
    let id = if inner.blank_user_ids {
      UserId(String::new())
    } else {
      UserId(Uuid::new_v4().to_string())
    };
    inner
      .users
      .insert(email.to_string(), (password.to_string(), id.clone()));
    Ok(id)
  }

  async fn fetch_profile(&self, filter: ProfileFilter) -> Result<Option<DonorProfile>, GatewayError> {
    self.pause().await;
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push("fetch_profile");
    if let Some(err) = inner.fetch_failure.take() {
      return Err(err);
    }
    let found = match &filter {
      ProfileFilter::CurrentUser => {
        let current = inner.current.clone();
        inner
          .profiles
          .iter()
          .find(|p| current.as_ref().is_some_and(|id| id.0 == p.id))
      }
      ProfileFilter::UserId(id) => inner.profiles.iter().find(|p| p.id == id.0),
      ProfileFilter::Email(email) => inner.profiles.iter().find(|p| &p.details.email == email),
    };
    Ok(found.map(DonorProfile::from))
  }

  async fn insert(&self, row: Row) -> Result<(), GatewayError> {
    self.pause().await;
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push("insert");
    if let Some(err) = inner.insert_failures.pop_front() {
      return Err(err);
    }
    if let Row::DonorDetail(detail) = &row {
      inner.profiles.push(detail.clone());
    }
    inner.inserted.push(row);
    Ok(())
  }

  async fn sign_out(&self) -> Result<(), GatewayError> {
    self.pause().await;
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push("sign_out");
    if let Some(err) = inner.sign_out_failure.take() {
      return Err(err);
    }
    inner.current = None;
    Ok(())
  }
}
