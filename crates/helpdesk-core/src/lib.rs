//! Helpdesk core crate - shared domain types, errors, configuration.
//!
//! Everything the other crates agree on lives here: the conversation and
//! message model, the top-level error enum, and the TOML configuration.

pub mod config;
pub mod error;
pub mod types;
