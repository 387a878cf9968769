//! The HTTP gateway.

use std::time::Duration;

use donor_core::{
  gateway::{AuthSession, Gateway, GatewayError, ProfileFilter, UserId},
  row::{DonorProfile, Row, Table},
};
use reqwest::{Client, Method, RequestBuilder, Response, header};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
  error::{Error, Result},
  wire::{Api, Credentials, ErrorBody, NO_ROWS, SignUpResponse, TokenResponse, classify},
};

/// PostgREST answers with one object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Connection settings for the backend project.
#[derive(Debug, Clone)]
pub struct RestConfig {
  /// Project URL, e.g. `https://xyz.supabase.co`.
  pub base_url: String,
  /// The project's public (anon) key.
  pub api_key:  String,
  pub timeout:  Duration,
}

/// HTTP implementation of [`Gateway`].
///
/// Holds the signed-in session; the access token is attached to every call
/// made after [`Gateway::authenticate`] succeeds.
pub struct RestGateway {
  client:  Client,
  config:  RestConfig,
  session: RwLock<Option<AuthSession>>,
}

impl RestGateway {
  pub fn new(config: RestConfig) -> Result<Self> {
    let base = config.base_url.trim();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
      return Err(Error::InvalidBaseUrl(config.base_url));
    }
    if config.api_key.trim().is_empty() {
      return Err(Error::MissingApiKey);
    }
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self {
      client,
      config,
      session: RwLock::new(None),
    })
  }

  pub async fn session(&self) -> Option<AuthSession> { self.session.read().await.clone() }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim().trim_end_matches('/'), path)
  }

  /// A request with the `apikey` header and the best available bearer.
  async fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let token = self
      .session
      .read()
      .await
      .as_ref()
      .map(|s| s.access_token.clone())
      .unwrap_or_else(|| self.config.api_key.clone());
    self
      .client
      .request(method, self.url(path))
      .header("apikey", &self.config.api_key)
      .bearer_auth(token)
  }

  async fn send(&self, api: Api, req: RequestBuilder) -> Result<Response, GatewayError> {
    let resp = req.send().await.map_err(transport)?;
    if resp.status().is_success() {
      return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(classify(api, status, &body))
  }
}

fn transport(e: reqwest::Error) -> GatewayError {
  if e.is_timeout() {
    GatewayError::Timeout
  } else {
    GatewayError::Transport(e.to_string())
  }
}

fn decode(e: reqwest::Error) -> GatewayError {
  if e.is_timeout() {
    GatewayError::Timeout
  } else {
    GatewayError::Unexpected(Some(format!("unreadable response: {e}")))
  }
}

/// Query pairs selecting one `donors_detail` row. `CurrentUser` relies on
/// the row-level policy to narrow the result.
pub(crate) fn profile_query(filter: &ProfileFilter) -> Vec<(&'static str, String)> {
  let mut query = vec![("select", "*".to_string())];
  match filter {
    ProfileFilter::CurrentUser => {}
    ProfileFilter::UserId(id) => query.push(("id", format!("eq.{id}"))),
    ProfileFilter::Email(email) => query.push(("email", format!("eq.{}", email.trim()))),
  }
  query
}

pub(crate) fn table_path(table: Table) -> String { format!("/rest/v1/{table}") }

impl Gateway for RestGateway {
  /// `POST /auth/v1/token?grant_type=password`
  async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError> {
    let req = self
      .request(Method::POST, "/auth/v1/token")
      .await
      .query(&[("grant_type", "password")])
      .json(&Credentials { email, password });
    let token: TokenResponse = self.send(Api::Auth, req).await?.json().await.map_err(decode)?;

    let session = AuthSession {
      user_id:      UserId(token.user.id),
      email:        token.user.email.unwrap_or_else(|| email.to_string()),
      access_token: token.access_token,
    };
    info!(user_id = %session.user_id, "authenticated");
    *self.session.write().await = Some(session.clone());
    Ok(session)
  }

  /// `POST /auth/v1/signup`. A session returned alongside the user becomes
  /// the current session, so the follow-up insert is authorised.
  async fn register(&self, email: &str, password: &str) -> Result<UserId, GatewayError> {
    let req = self
      .request(Method::POST, "/auth/v1/signup")
      .await
      .json(&Credentials { email, password });
    let body: SignUpResponse = self.send(Api::Auth, req).await?.json().await.map_err(decode)?;

    let Some(id) = body.user_id().map(|id| UserId(id.to_string())) else {
      warn!("sign-up response carried no user id");
      return Err(GatewayError::Unexpected(Some(
        "User ID not found after registration".into(),
      )));
    };
    if let Some(access_token) = body.access_token {
      *self.session.write().await = Some(AuthSession {
        user_id: id.clone(),
        email: email.to_string(),
        access_token,
      });
    }
    info!(user_id = %id, "registered");
    Ok(id)
  }

  /// `GET /rest/v1/donors_detail?select=*&<col>=eq.<value>`
  async fn fetch_profile(&self, filter: ProfileFilter) -> Result<Option<DonorProfile>, GatewayError> {
    let req = self
      .request(Method::GET, &table_path(Table::DonorsDetail))
      .await
      .query(&profile_query(&filter))
      .header(header::ACCEPT, SINGLE_OBJECT);

    let resp = req.send().await.map_err(transport)?;
    let status = resp.status();
    if status.is_success() {
      return resp.json().await.map(Some).map_err(decode);
    }
    let body = resp.text().await.unwrap_or_default();
    if ErrorBody::parse(&body).code().as_deref() == Some(NO_ROWS) {
      debug!("no donor profile");
      return Ok(None);
    }
    Err(classify(Api::Rest, status, &body))
  }

  /// `POST /rest/v1/<table>` with a one-element array.
  async fn insert(&self, row: Row) -> Result<(), GatewayError> {
    let table = row.table();
    let json = row
      .to_json()
      .map_err(|e| GatewayError::Unexpected(Some(e.to_string())))?;
    let req = self
      .request(Method::POST, &table_path(table))
      .await
      .header("Prefer", "return=minimal")
      .json(&[json]);
    self.send(Api::Rest, req).await?;
    debug!(%table, "row inserted");
    Ok(())
  }

  /// `POST /auth/v1/logout`. Without a session there is nothing to end.
  async fn sign_out(&self) -> Result<(), GatewayError> {
    if self.session.read().await.is_none() {
      return Ok(());
    }
    let req = self.request(Method::POST, "/auth/v1/logout").await;
    self.send(Api::Auth, req).await?;
    *self.session.write().await = None;
    info!("signed out");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(base_url: &str) -> RestConfig {
    RestConfig {
      base_url: base_url.into(),
      api_key:  "anon-key".into(),
      timeout:  Duration::from_secs(5),
    }
  }

  #[test]
  fn rejects_bad_settings() {
    assert!(matches!(
      RestGateway::new(config("xyz.supabase.co")),
      Err(Error::InvalidBaseUrl(_))
    ));
    let mut no_key = config("https://xyz.supabase.co");
    no_key.api_key = " ".into();
    assert!(matches!(RestGateway::new(no_key), Err(Error::MissingApiKey)));
  }

  #[test]
  fn urls_ignore_trailing_slash() {
    let gw = RestGateway::new(config("https://xyz.supabase.co/")).unwrap();
    assert_eq!(
      gw.url(&table_path(Table::DonorForm)),
      "https://xyz.supabase.co/rest/v1/donor_form"
    );
    assert_eq!(gw.url("/auth/v1/signup"), "https://xyz.supabase.co/auth/v1/signup");
  }

  #[test]
  fn profile_filters_become_eq_queries() {
    assert_eq!(profile_query(&ProfileFilter::CurrentUser), [("select", "*".to_string())]);
    assert_eq!(
      profile_query(&ProfileFilter::Email(" maria@example.com ".into())),
      [
        ("select", "*".to_string()),
        ("email", "eq.maria@example.com".to_string())
      ]
    );
    assert_eq!(
      profile_query(&ProfileFilter::UserId(UserId("u-1".into())))[1],
      ("id", "eq.u-1".to_string())
    );
  }

  #[tokio::test]
  async fn requests_carry_api_key_and_bearer() {
    let gw = RestGateway::new(config("https://xyz.supabase.co")).unwrap();
    let req = gw.request(Method::GET, "/rest/v1/donors_detail").await.build().unwrap();
    assert_eq!(req.headers()["apikey"], "anon-key");
    assert_eq!(req.headers()[header::AUTHORIZATION], "Bearer anon-key");

    *gw.session.write().await = Some(AuthSession {
      user_id:      UserId("u-1".into()),
      email:        "maria@example.com".into(),
      access_token: "user-token".into(),
    });
    let req = gw.request(Method::GET, "/rest/v1/donors_detail").await.build().unwrap();
    assert_eq!(req.headers()[header::AUTHORIZATION], "Bearer user-token");
  }

  #[tokio::test]
  async fn sign_out_without_session_is_local() {
    let gw = RestGateway::new(config("http://127.0.0.1:9")).unwrap();
    gw.sign_out().await.unwrap();
    assert!(gw.session().await.is_none());
  }
}
