//! Single-owner gate for mutating registry calls.

use crate::access::principal::Principal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Holds the one principal allowed to mutate the registry.
///
/// The owner is fixed at construction. There is no transfer operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    owner: Principal,
}

impl AccessGuard {
    pub fn new(owner: Principal) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Fails with `Unauthorized` unless `caller` is the owner.
    pub fn check_owner(&self, caller: &Principal) -> Result<(), AccessError> {
        if caller != &self.owner {
            return Err(AccessError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }
}

/// Owner gate rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    Unauthorized { caller: Principal },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { .. } => write!(f, "Only the owner can perform this action"),
        }
    }
}

impl Error for AccessError {}
