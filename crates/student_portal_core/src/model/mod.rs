//! Student registry domain model.
//!
//! # Responsibility
//! - Define the slot layout, descriptive profile and notification types.
//!
//! # Invariants
//! - Every slot is identified by a sequential `StudentId` starting at 1.
//! - Deletion is a soft-delete marker with cleared fields, never removal.

pub mod date_of_birth;
pub mod event;
pub mod student;
