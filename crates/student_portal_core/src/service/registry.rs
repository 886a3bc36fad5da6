//! Student registry use-case service.
//!
//! # Responsibility
//! - Gate every mutating call through `AccessGuard`.
//! - Allocate sequential ids and drive the per-slot state machine.
//! - Append one notification per successful mutating call.
//!
//! # Invariants
//! - The owner check runs before any id validation or storage access.
//! - `get_student_count()` counts allocated slots, deleted ones included.
//! - Each mutating call is one repository transaction; failures leave no trace.
//! - `update_student` does not inspect the delete marker and re-activates the slot.

use crate::access::guard::{AccessError, AccessGuard};
use crate::access::principal::Principal;
use crate::model::event::{RecordedEvent, RegistryEvent};
use crate::model::student::{Student, StudentId, StudentProfile};
use crate::repo::student_repo::{RepoError, StudentRepository};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Domain and persistence failures of registry calls.
#[derive(Debug)]
pub enum RegistryError {
    /// Caller is not the registry owner.
    Unauthorized { caller: Principal },
    /// Id is 0 or beyond the highest allocated id.
    InvalidId(StudentId),
    /// Slot exists but is soft-deleted. Only raised by `get_student`.
    NotFound(StudentId),
    /// Slot was already soft-deleted.
    AlreadyDeleted(StudentId),
    /// `deploy` found an owner already recorded.
    AlreadyDeployed { owner: Principal },
    /// `attach` found no owner recorded.
    NotDeployed,
    Repo(RepoError),
}

impl RegistryError {
    /// Short machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidId(_) => "invalid_id",
            Self::NotFound(_) => "not_found",
            Self::AlreadyDeleted(_) => "already_deleted",
            Self::AlreadyDeployed { .. } => "already_deployed",
            Self::NotDeployed => "not_deployed",
            Self::Repo(_) => "repo_error",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized { .. } => write!(f, "Only the owner can perform this action"),
            Self::InvalidId(_) => write!(f, "Invalid student ID"),
            Self::NotFound(_) => write!(f, "Student not found"),
            Self::AlreadyDeleted(_) => write!(f, "Student already deleted"),
            Self::AlreadyDeployed { owner } => {
                write!(f, "registry already deployed with owner `{owner}`")
            }
            Self::NotDeployed => write!(f, "registry has not been deployed"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AccessError> for RegistryError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::Unauthorized { caller } => Self::Unauthorized { caller },
        }
    }
}

/// Owner-gated student registry over a repository implementation.
pub struct StudentRegistry<R: StudentRepository> {
    repo: R,
    guard: AccessGuard,
}

impl<R: StudentRepository> StudentRegistry<R> {
    /// Creates a registry owned by `owner` on an empty store.
    ///
    /// # Errors
    /// - `AlreadyDeployed` when the store already records an owner.
    pub fn deploy(repo: R, owner: Principal) -> RegistryResult<Self> {
        repo.in_transaction(|repo| -> RegistryResult<()> {
            if let Some(existing) = repo.owner()? {
                return Err(RegistryError::AlreadyDeployed { owner: existing });
            }
            repo.record_owner(&owner)?;
            Ok(())
        })
        .inspect_err(|err| {
            warn!(
                "event=registry_deploy module=registry status=rejected error_code={}",
                err.code()
            );
        })?;

        info!("event=registry_deploy module=registry status=ok");
        Ok(Self {
            repo,
            guard: AccessGuard::new(owner),
        })
    }

    /// Reopens a previously deployed registry with its recorded owner.
    ///
    /// # Errors
    /// - `NotDeployed` when no owner has been recorded.
    pub fn attach(repo: R) -> RegistryResult<Self> {
        let owner = repo.owner()?.ok_or(RegistryError::NotDeployed)?;
        Ok(Self {
            repo,
            guard: AccessGuard::new(owner),
        })
    }

    pub fn owner(&self) -> &Principal {
        self.guard.owner()
    }

    /// Registers a new active student and returns its id.
    ///
    /// # Contract
    /// - Owner only. Field contents are not validated.
    /// - The returned id equals the previous slot count plus one.
    /// - Emits `StudentRegistered(id)`.
    pub fn register_student(
        &self,
        caller: &Principal,
        profile: StudentProfile,
    ) -> RegistryResult<StudentId> {
        let result = self.guarded(caller).and_then(|()| {
            self.repo.in_transaction(|repo| -> RegistryResult<StudentId> {
                let id = repo.slot_count()? + 1;
                repo.insert_slot(&Student::new(id, profile))?;
                repo.append_event(RegistryEvent::StudentRegistered(id))?;
                Ok(id)
            })
        });
        log_outcome("student_register", result.as_ref().ok().copied(), &result);
        result
    }

    /// Returns one active student.
    ///
    /// # Errors
    /// - `InvalidId` when `id` is 0 or greater than the slot count.
    /// - `NotFound` when the slot is soft-deleted.
    pub fn get_student(&self, id: StudentId) -> RegistryResult<Student> {
        let student = self.allocated_slot(id)?;
        if student.is_deleted {
            return Err(RegistryError::NotFound(id));
        }
        Ok(student)
    }

    /// Returns every allocated slot ordered by id, deleted ones included.
    ///
    /// Deleted slots surface with cleared fields and `is_deleted = true`.
    pub fn get_all_students(&self) -> RegistryResult<Vec<Student>> {
        Ok(self.repo.list_slots()?)
    }

    /// Overwrites every descriptive field of an allocated slot.
    ///
    /// # Contract
    /// - Owner only.
    /// - Deleted slots are accepted and become active again.
    /// - Emits `StudentUpdated(id)`.
    pub fn update_student(
        &self,
        caller: &Principal,
        id: StudentId,
        profile: StudentProfile,
    ) -> RegistryResult<()> {
        let result = self.guarded(caller).and_then(|()| {
            self.repo.in_transaction(|repo| -> RegistryResult<()> {
                let mut student = allocated_slot_in(repo, id)?;
                student.overwrite(profile);
                repo.write_slot(&student)?;
                repo.append_event(RegistryEvent::StudentUpdated(id))?;
                Ok(())
            })
        });
        log_outcome("student_update", Some(id), &result);
        result
    }

    /// Soft-deletes a slot and clears its descriptive fields.
    ///
    /// # Contract
    /// - Owner only.
    /// - Not idempotent: a second call fails with `AlreadyDeleted`.
    /// - Emits `StudentDeleted(id)`.
    pub fn delete_student(&self, caller: &Principal, id: StudentId) -> RegistryResult<()> {
        let result = self.guarded(caller).and_then(|()| {
            self.repo.in_transaction(|repo| -> RegistryResult<()> {
                let mut student = allocated_slot_in(repo, id)?;
                if student.is_deleted {
                    return Err(RegistryError::AlreadyDeleted(id));
                }
                student.soft_delete();
                repo.write_slot(&student)?;
                repo.append_event(RegistryEvent::StudentDeleted(id))?;
                Ok(())
            })
        });
        log_outcome("student_delete", Some(id), &result);
        result
    }

    /// Number of slots ever allocated, deleted ones included.
    pub fn get_student_count(&self) -> RegistryResult<u64> {
        Ok(self.repo.slot_count()?)
    }

    /// Notification log in emission order.
    pub fn events(&self) -> RegistryResult<Vec<RecordedEvent>> {
        Ok(self.repo.list_events()?)
    }

    fn guarded(&self, caller: &Principal) -> RegistryResult<()> {
        Ok(self.guard.check_owner(caller)?)
    }

    fn allocated_slot(&self, id: StudentId) -> RegistryResult<Student> {
        allocated_slot_in(&self.repo, id)
    }
}

/// Loads slot `id`, failing `InvalidId` outside `1..=slot_count`.
fn allocated_slot_in<R: StudentRepository>(repo: &R, id: StudentId) -> RegistryResult<Student> {
    if id == 0 || id > repo.slot_count()? {
        return Err(RegistryError::InvalidId(id));
    }
    repo.get_slot(id)?
        .ok_or_else(|| RegistryError::Repo(RepoError::InvalidData(format!("slot {id} missing"))))
}

fn log_outcome<T>(event: &str, student_id: Option<StudentId>, result: &RegistryResult<T>) {
    let id = student_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match result {
        Ok(_) => info!("event={event} module=registry status=ok student_id={id}"),
        Err(RegistryError::Repo(err)) => warn!(
            "event={event} module=registry status=error student_id={id} error_code=repo_error error={err}"
        ),
        Err(err) => warn!(
            "event={event} module=registry status=rejected student_id={id} error_code={}",
            err.code()
        ),
    }
}
