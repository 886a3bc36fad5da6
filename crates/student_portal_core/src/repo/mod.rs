//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define slot-oriented data access contracts.
//! - Isolate SQLite query details from registry orchestration.
//!
//! # Invariants
//! - Repository APIs return `Option` for absent slots; the service layer maps
//!   absence to domain errors.

pub mod student_repo;
