//! Notifications emitted by successful mutating registry calls.

use crate::model::student::StudentId;
use serde::{Deserialize, Serialize};

/// One notification per successful register/update/delete call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "id")]
pub enum RegistryEvent {
    StudentRegistered(StudentId),
    StudentUpdated(StudentId),
    StudentDeleted(StudentId),
}

impl RegistryEvent {
    /// Stable name used for persistence and log lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::StudentRegistered(_) => "StudentRegistered",
            Self::StudentUpdated(_) => "StudentUpdated",
            Self::StudentDeleted(_) => "StudentDeleted",
        }
    }

    pub fn student_id(self) -> StudentId {
        match self {
            Self::StudentRegistered(id) | Self::StudentUpdated(id) | Self::StudentDeleted(id) => id,
        }
    }

    /// Rebuilds an event from its persisted name and id.
    pub fn from_parts(name: &str, id: StudentId) -> Option<Self> {
        match name {
            "StudentRegistered" => Some(Self::StudentRegistered(id)),
            "StudentUpdated" => Some(Self::StudentUpdated(id)),
            "StudentDeleted" => Some(Self::StudentDeleted(id)),
            _ => None,
        }
    }
}

/// An event together with its position in the append-only log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Starts at 1 and increases by one per appended event.
    pub seq: u64,
    #[serde(flatten)]
    pub event: RegistryEvent,
}

#[cfg(test)]
mod tests {
    use super::RegistryEvent;

    #[test]
    fn name_and_parts_agree() {
        for event in [
            RegistryEvent::StudentRegistered(1),
            RegistryEvent::StudentUpdated(2),
            RegistryEvent::StudentDeleted(3),
        ] {
            let rebuilt = RegistryEvent::from_parts(event.name(), event.student_id());
            assert_eq!(rebuilt, Some(event));
        }
        assert_eq!(RegistryEvent::from_parts("StudentMoved", 1), None);
    }
}
