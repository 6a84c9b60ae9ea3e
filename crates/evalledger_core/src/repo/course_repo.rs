//! Course catalog repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own the `courses` table and the monotonic course-id counter.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `allocate_course_id` advances the counter and never hands out the same
//!   id twice; rollback of the surrounding transaction is the only way an
//!   allocated id goes unused, and then the counter rewinds with it.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::course::{Course, CourseId};
use crate::model::identity::Identity;
use crate::repo::{advance_counter, COUNTER_COURSE_ID};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error shared by all ledger stores.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    CourseNotFound(CourseId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::CourseNotFound(course_id) => write!(f, "course not found: {course_id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted ledger data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
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

/// Repository interface for the course catalog.
pub trait CourseRepository {
    /// Advances the id counter and returns the newly allocated id.
    fn allocate_course_id(&self) -> RepoResult<CourseId>;
    /// Inserts a freshly allocated course record.
    fn insert_course(&self, course: &Course) -> RepoResult<()>;
    /// Gets one course by id; absence is a valid result.
    fn get_course(&self, course_id: CourseId) -> RepoResult<Option<Course>>;
    /// Replaces the assigned instructor, all other fields unchanged.
    fn set_instructor(&self, course_id: CourseId, instructor: &Identity) -> RepoResult<()>;
    /// Replaces the evaluation-acceptance flag.
    fn set_accepting(&self, course_id: CourseId, accepting: bool) -> RepoResult<()>;
}

/// SQLite-backed course catalog repository.
pub struct SqliteCourseRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourseRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourseRepository for SqliteCourseRepository<'_> {
    fn allocate_course_id(&self) -> RepoResult<CourseId> {
        advance_counter(self.conn, COUNTER_COURSE_ID)
    }

    fn insert_course(&self, course: &Course) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO courses (id, name, instructor, accepting)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                course.id,
                course.name.as_str(),
                course.instructor.as_str(),
                bool_to_int(course.accepting),
            ],
        )?;
        Ok(())
    }

    fn get_course(&self, course_id: CourseId) -> RepoResult<Option<Course>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, instructor, accepting
                 FROM courses
                 WHERE id = ?1;",
                [course_id],
                parse_course_row,
            )
            .optional()?;
        row.transpose()
    }

    fn set_instructor(&self, course_id: CourseId, instructor: &Identity) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE courses SET instructor = ?2 WHERE id = ?1;",
            params![course_id, instructor.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::CourseNotFound(course_id));
        }
        Ok(())
    }

    fn set_accepting(&self, course_id: CourseId, accepting: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE courses SET accepting = ?2 WHERE id = ?1;",
            params![course_id, bool_to_int(accepting)],
        )?;
        if changed == 0 {
            return Err(RepoError::CourseNotFound(course_id));
        }
        Ok(())
    }
}

fn parse_course_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<Course>> {
    let id: CourseId = row.get("id")?;
    let name: String = row.get("name")?;
    let instructor: String = row.get("instructor")?;
    let accepting: i64 = row.get("accepting")?;

    Ok(match int_to_bool(accepting) {
        Some(accepting) => Ok(Course {
            id,
            name,
            instructor: Identity::new(instructor),
            accepting,
        }),
        None => Err(RepoError::InvalidData(format!(
            "invalid accepting value `{accepting}` in courses.accepting"
        ))),
    })
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}
