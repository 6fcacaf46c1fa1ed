//! Data models for the conference application.
//!
//! Field names serialize in camelCase to match the web client.

mod conference;
mod profile;

pub use conference::*;
pub use profile::*;
