//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate access checks and repository calls into registry APIs.
//! - Keep CLI callers decoupled from storage details.

pub mod registry;
