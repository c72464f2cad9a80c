//! Shared infrastructure for the college-management services
//!
//! This crate provides the pieces used by more than one workspace member:
//! database connectivity, shared error types, the JSON response envelope
//! every endpoint speaks, and the principal-kind variant that identifies
//! who is acting.

pub mod database;
pub mod envelope;
pub mod error;
pub mod principal;

pub use envelope::{Envelope, INVALID_TOKEN_MESSAGE};
pub use principal::PrincipalKind;
