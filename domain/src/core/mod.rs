//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelId`]: name of an installed inference model
//! - [`prompt::UserPrompt`]: a validated, non-empty user message
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod prompt;
