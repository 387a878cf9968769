//! `donor-gateway`: [`Gateway`](donor_core::gateway::Gateway) over a
//! Supabase-compatible HTTP API.
//!
//! Auth lives under `/auth/v1`, table access under `/rest/v1` in the
//! PostgREST dialect. Every request carries the project's `apikey` header;
//! once signed in, the user's access token is sent as the bearer.

pub mod error;
pub mod rest;
mod wire;

pub use error::{Error, Result};
pub use rest::{RestConfig, RestGateway};
