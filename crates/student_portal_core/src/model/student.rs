//! Student record model.
//!
//! # Responsibility
//! - Define the slot layout stored for every allocated student id.
//! - Provide lifecycle helpers for soft-delete and overwrite semantics.
//!
//! # Invariants
//! - `id` is assigned by the registry and never changes.
//! - A deleted slot keeps its `id` and carries empty descriptive fields.
//! - `overwrite` always leaves the slot active.

use crate::model::date_of_birth::DateOfBirth;
use serde::{Deserialize, Serialize};

/// Sequential student identifier. The first allocated id is `1`.
pub type StudentId = u64;

/// Descriptive fields supplied by register and update calls.
///
/// No content validation is applied: empty text and zero dates are valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub name: String,
    pub email: String,
    pub date_of_birth: DateOfBirth,
    pub local_government_area: String,
    pub country: String,
    pub state: String,
}

impl StudentProfile {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        date_of_birth: DateOfBirth,
        local_government_area: impl Into<String>,
        country: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            date_of_birth,
            local_government_area: local_government_area.into(),
            country: country.into(),
            state: state.into(),
        }
    }
}

/// One allocated slot in the student table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub date_of_birth: DateOfBirth,
    pub local_government_area: String,
    pub country: String,
    pub state: String,
    /// Soft delete marker. Deleted slots stay enumerable.
    pub is_deleted: bool,
}

impl Student {
    /// Creates an active slot at `id` from the given profile.
    pub fn new(id: StudentId, profile: StudentProfile) -> Self {
        Self {
            id,
            name: profile.name,
            email: profile.email,
            date_of_birth: profile.date_of_birth,
            local_government_area: profile.local_government_area,
            country: profile.country,
            state: profile.state,
            is_deleted: false,
        }
    }

    /// Marks the slot deleted and clears every descriptive field.
    pub fn soft_delete(&mut self) {
        *self = Self {
            is_deleted: true,
            ..Self::new(self.id, StudentProfile::default())
        };
    }

    /// Replaces every descriptive field and clears the delete marker.
    pub fn overwrite(&mut self, profile: StudentProfile) {
        *self = Self::new(self.id, profile);
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Returns the descriptive fields of this slot.
    pub fn profile(&self) -> StudentProfile {
        StudentProfile {
            name: self.name.clone(),
            email: self.email.clone(),
            date_of_birth: self.date_of_birth,
            local_government_area: self.local_government_area.clone(),
            country: self.country.clone(),
            state: self.state.clone(),
        }
    }
}
