//! Core domain logic for the student portal registry.
//! This crate is the single source of truth for registry invariants.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::guard::{AccessError, AccessGuard};
pub use access::principal::{Principal, PrincipalError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::date_of_birth::{DateOfBirth, DateOfBirthError};
pub use model::event::{RecordedEvent, RegistryEvent};
pub use model::student::{Student, StudentId, StudentProfile};
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use service::registry::{RegistryError, RegistryResult, StudentRegistry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
