//! Core types and trait definitions for donor intake.
//!
//! This crate has no HTTP or runtime dependencies. It holds the donor and
//! declaration records, the interview form state, identifier generation,
//! validation rules, the persisted row shapes and the [`gateway::Gateway`]
//! trait that remote backends implement.

// Native `async fn` in traits; implementors return `Send` futures explicitly.
#![allow(async_fn_in_trait)]

pub mod date;
pub mod declaration;
pub mod error;
pub mod form;
pub mod gateway;
pub mod identifiers;
pub mod record;
pub mod registration;
pub mod row;
pub mod validate;

pub use error::{Error, Result};
