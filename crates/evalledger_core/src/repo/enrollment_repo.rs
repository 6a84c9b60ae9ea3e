//! Enrollment registry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Own per-(course, student) eligibility flags.
//!
//! # Invariants
//! - Upserting an already-enrolled pair is a state-level no-op.
//! - There is no revocation path; enrollment rows are never deleted.

use crate::model::course::CourseId;
use crate::model::evaluation::Enrollment;
use crate::model::identity::Identity;
use crate::repo::course_repo::{int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for the enrollment registry.
pub trait EnrollmentRepository {
    /// Sets or overwrites the enrollment record to `enrolled = true`.
    fn upsert_enrollment(&self, course_id: CourseId, student: &Identity) -> RepoResult<()>;
    /// Gets one enrollment record; absence means "not enrolled".
    fn get_enrollment(
        &self,
        course_id: CourseId,
        student: &Identity,
    ) -> RepoResult<Option<Enrollment>>;
}

/// SQLite-backed enrollment registry.
pub struct SqliteEnrollmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EnrollmentRepository for SqliteEnrollmentRepository<'_> {
    fn upsert_enrollment(&self, course_id: CourseId, student: &Identity) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO enrollments (course_id, student, enrolled)
             VALUES (?1, ?2, 1)
             ON CONFLICT (course_id, student) DO UPDATE SET enrolled = 1;",
            params![course_id, student.as_str()],
        )?;
        Ok(())
    }

    fn get_enrollment(
        &self,
        course_id: CourseId,
        student: &Identity,
    ) -> RepoResult<Option<Enrollment>> {
        let row = self
            .conn
            .query_row(
                "SELECT enrolled
                 FROM enrollments
                 WHERE course_id = ?1 AND student = ?2;",
                params![course_id, student.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some(value) => {
                let enrolled = int_to_bool(value).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid enrolled value `{value}` in enrollments.enrolled"
                    ))
                })?;
                Ok(Some(Enrollment {
                    course_id,
                    student: student.clone(),
                    enrolled,
                }))
            }
        }
    }
}
