//! Access control for registry mutations.
//!
//! # Invariants
//! - Exactly one owner exists per registry and it never changes.
//! - Every mutating registry operation calls `AccessGuard::check_owner` first.

pub mod guard;
pub mod principal;
