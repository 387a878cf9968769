//! `donor`: terminal front-end for blood donor registration and intake.
//!
//! # Usage
//!
//! ```
//! donor --base-url https://xyz.supabase.co --api-key <anon key>
//! donor --config ~/.config/donor/donor.toml
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` for state transitions.

mod app;
mod prompt;
mod settings;

use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use donor_gateway::RestGateway;
use prompt::Prompt;
use settings::ClientConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "donor", version, about = "Blood donor registration and intake")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "donor.toml")]
  config: PathBuf,

  /// Backend project URL.
  #[arg(long, env = "DONOR_BASE_URL")]
  base_url: Option<String>,

  /// Public API key of the backend project.
  #[arg(long, env = "DONOR_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Deadline for each backend call, in seconds.
  #[arg(long, env = "DONOR_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,
}

impl Args {
  /// Flags take precedence over the file and environment layers.
  fn apply(self, mut cfg: ClientConfig) -> ClientConfig {
    if let Some(url) = self.base_url {
      cfg.base_url = url;
    }
    if let Some(key) = self.api_key {
      cfg.api_key = key;
    }
    if let Some(secs) = self.timeout_secs {
      cfg.timeout_secs = secs;
    }
    cfg
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();
  let cfg = ClientConfig::load(&args.config)?;
  let cfg = args.apply(cfg);

  let gateway = RestGateway::new(cfg.rest())
    .with_context(|| format!("invalid backend settings for {:?}", cfg.base_url))?;
  tracing::info!(base_url = %cfg.base_url, "backend configured");

  let prompt = Prompt::new(io::stdin().lock(), io::stdout());
  let mut app = App::new(Arc::new(gateway), cfg.intake(), prompt);
  app.run().await
}
