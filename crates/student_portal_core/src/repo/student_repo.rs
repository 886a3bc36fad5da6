//! Student slot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist student slots, the registry owner and the notification log.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Slots are only inserted or rewritten in place, never removed.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Access control and id range checks live in the service layer.

use crate::access::principal::Principal;
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::date_of_birth::DateOfBirth;
use crate::model::event::{RecordedEvent, RegistryEvent};
use crate::model::student::{Student, StudentId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    date_of_birth,
    local_government_area,
    country,
    state,
    is_deleted
FROM students";

const REQUIRED_TABLES: &[&str] = &["registry_meta", "students", "registry_events"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// A slot write targeted an id that was never allocated.
    SlotNotAllocated(StudentId),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::SlotNotAllocated(id) => write!(f, "student slot {id} is not allocated"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract behind `StudentRegistry`.
pub trait StudentRepository {
    /// Returns the recorded owner, or `None` before deployment.
    fn owner(&self) -> RepoResult<Option<Principal>>;
    /// Records the owner. Callers must check `owner()` first.
    fn record_owner(&self, owner: &Principal) -> RepoResult<()>;
    /// Number of slots ever allocated, deleted ones included.
    fn slot_count(&self) -> RepoResult<u64>;
    /// Loads one slot regardless of its delete marker.
    fn get_slot(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Loads every slot ordered by id.
    fn list_slots(&self) -> RepoResult<Vec<Student>>;
    /// Inserts a new slot at `student.id`.
    fn insert_slot(&self, student: &Student) -> RepoResult<()>;
    /// Rewrites an allocated slot in place.
    fn write_slot(&self, student: &Student) -> RepoResult<()>;
    /// Appends one notification and returns its sequence number.
    fn append_event(&self, event: RegistryEvent) -> RepoResult<u64>;
    /// Returns the notification log in append order.
    fn list_events(&self) -> RepoResult<Vec<RecordedEvent>>;
    /// Runs `op` atomically: on error nothing `op` wrote is kept.
    fn in_transaction<T, E>(&self, op: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Wraps a connection produced by `db::open_db`/`db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` when the schema was tampered with.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for table in REQUIRED_TABLES {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
                [table],
                |row| row.get(0),
            )?;
            if !exists {
                return Err(RepoError::MissingRequiredTable(*table));
            }
        }

        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn owner(&self) -> RepoResult<Option<Principal>> {
        let owner: Option<String> = self
            .conn
            .query_row(
                "SELECT owner FROM registry_meta WHERE singleton = 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;

        owner
            .map(|value| {
                Principal::parse(&value).map_err(|err| {
                    RepoError::InvalidData(format!("invalid owner in registry_meta.owner: {err}"))
                })
            })
            .transpose()
    }

    fn record_owner(&self, owner: &Principal) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO registry_meta (singleton, owner) VALUES (1, ?1);",
            [owner.as_str()],
        )?;
        Ok(())
    }

    fn slot_count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative slot count `{count}`")))
    }

    fn get_slot(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let Ok(db_id) = i64::try_from(id) else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([db_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn list_slots(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();

        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn insert_slot(&self, student: &Student) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO students (
                id,
                name,
                email,
                date_of_birth,
                local_government_area,
                country,
                state,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id_to_db(student.id)?,
                student.name.as_str(),
                student.email.as_str(),
                student.date_of_birth.to_be_bytes().as_slice(),
                student.local_government_area.as_str(),
                student.country.as_str(),
                student.state.as_str(),
                bool_to_int(student.is_deleted),
            ],
        )?;

        Ok(())
    }

    fn write_slot(&self, student: &Student) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                email = ?2,
                date_of_birth = ?3,
                local_government_area = ?4,
                country = ?5,
                state = ?6,
                is_deleted = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?8;",
            params![
                student.name.as_str(),
                student.email.as_str(),
                student.date_of_birth.to_be_bytes().as_slice(),
                student.local_government_area.as_str(),
                student.country.as_str(),
                student.state.as_str(),
                bool_to_int(student.is_deleted),
                id_to_db(student.id)?,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::SlotNotAllocated(student.id));
        }

        Ok(())
    }

    fn append_event(&self, event: RegistryEvent) -> RepoResult<u64> {
        self.conn.execute(
            "INSERT INTO registry_events (name, student_id) VALUES (?1, ?2);",
            params![event.name(), id_to_db(event.student_id())?],
        )?;
        let seq = self.conn.last_insert_rowid();
        u64::try_from(seq).map_err(|_| RepoError::InvalidData(format!("invalid event seq `{seq}`")))
    }

    fn list_events(&self) -> RepoResult<Vec<RecordedEvent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, name, student_id FROM registry_events ORDER BY seq ASC;")?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            let seq = id_from_db(row.get("seq")?, "registry_events.seq")?;
            let student_id = id_from_db(row.get("student_id")?, "registry_events.student_id")?;
            let name: String = row.get("name")?;
            let event = RegistryEvent::from_parts(&name, student_id).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid event name `{name}` in registry_events.name"
                ))
            })?;
            events.push(RecordedEvent { seq, event });
        }

        Ok(events)
    }

    fn in_transaction<T, E>(&self, op: impl FnOnce(&Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        // Dropping `tx` without commit rolls back.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|err| E::from(RepoError::from(err)))?;
        let output = op(self)?;
        tx.commit().map_err(|err| E::from(RepoError::from(err)))?;
        Ok(output)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id = id_from_db(row.get("id")?, "students.id")?;

    let dob_bytes: Vec<u8> = row.get("date_of_birth")?;
    let date_of_birth = DateOfBirth::from_be_slice(&dob_bytes).map_err(|err| {
        RepoError::InvalidData(format!("{err} in students.date_of_birth for id {id}"))
    })?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in students.is_deleted"
            )));
        }
    };

    Ok(Student {
        id,
        name: row.get("name")?,
        email: row.get("email")?,
        date_of_birth,
        local_government_area: row.get("local_government_area")?,
        country: row.get("country")?,
        state: row.get("state")?,
        is_deleted,
    })
}

fn id_to_db(id: StudentId) -> RepoResult<i64> {
    i64::try_from(id).map_err(|_| RepoError::InvalidData(format!("student id {id} out of range")))
}

fn id_from_db(value: i64, column: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid value `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
