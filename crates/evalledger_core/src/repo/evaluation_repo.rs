//! Evaluation store and aggregate tracker repository.
//!
//! # Responsibility
//! - Own `evaluations` rows and the derived per-course `aggregates`.
//!
//! # Invariants
//! - The (course_id, student) primary key enforces at-most-one evaluation
//!   per pair at the storage layer; inserts never overwrite.
//! - `apply_rating` adds to sum and count together, never independently, and
//!   must run in the same transaction as the evaluation insert.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::course::CourseId;
use crate::model::evaluation::{rating_in_range, Aggregate, Evaluation};
use crate::model::identity::Identity;
use crate::repo::course_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for evaluations and their rating aggregates.
pub trait EvaluationRepository {
    /// Inserts one immutable evaluation record.
    fn insert_evaluation(&self, evaluation: &Evaluation) -> RepoResult<()>;
    /// Gets one evaluation by (course, student); absence is a valid result.
    fn get_evaluation(
        &self,
        course_id: CourseId,
        student: &Identity,
    ) -> RepoResult<Option<Evaluation>>;
    /// Inserts the aggregate row created alongside a new course.
    fn insert_aggregate(&self, aggregate: &Aggregate) -> RepoResult<()>;
    /// Adds `rating` to the course's sum and increments its count by one,
    /// creating the aggregate with these as initial values if none exists.
    fn apply_rating(&self, course_id: CourseId, rating: u8) -> RepoResult<()>;
    /// Gets the running aggregate for one course.
    fn get_aggregate(&self, course_id: CourseId) -> RepoResult<Option<Aggregate>>;
}

/// SQLite-backed evaluation store + aggregate tracker.
pub struct SqliteEvaluationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEvaluationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EvaluationRepository for SqliteEvaluationRepository<'_> {
    fn insert_evaluation(&self, evaluation: &Evaluation) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO evaluations (course_id, student, rating, commentary, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                evaluation.course_id,
                evaluation.student.as_str(),
                i64::from(evaluation.rating),
                evaluation.commentary.as_str(),
                evaluation.submitted_at,
            ],
        )?;
        Ok(())
    }

    fn get_evaluation(
        &self,
        course_id: CourseId,
        student: &Identity,
    ) -> RepoResult<Option<Evaluation>> {
        let row = self
            .conn
            .query_row(
                "SELECT course_id, student, rating, commentary, submitted_at
                 FROM evaluations
                 WHERE course_id = ?1 AND student = ?2;",
                params![course_id, student.as_str()],
                parse_evaluation_row,
            )
            .optional()?;
        row.transpose()
    }

    fn insert_aggregate(&self, aggregate: &Aggregate) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO aggregates (course_id, rating_sum, rating_count)
             VALUES (?1, ?2, ?3);",
            params![
                aggregate.course_id,
                aggregate.rating_sum,
                aggregate.rating_count
            ],
        )?;
        Ok(())
    }

    fn apply_rating(&self, course_id: CourseId, rating: u8) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO aggregates (course_id, rating_sum, rating_count)
             VALUES (?1, ?2, 1)
             ON CONFLICT (course_id) DO UPDATE SET
                rating_sum = rating_sum + excluded.rating_sum,
                rating_count = rating_count + 1;",
            params![course_id, i64::from(rating)],
        )?;
        Ok(())
    }

    fn get_aggregate(&self, course_id: CourseId) -> RepoResult<Option<Aggregate>> {
        let aggregate = self
            .conn
            .query_row(
                "SELECT course_id, rating_sum, rating_count
                 FROM aggregates
                 WHERE course_id = ?1;",
                [course_id],
                |row| {
                    Ok(Aggregate {
                        course_id: row.get("course_id")?,
                        rating_sum: row.get("rating_sum")?,
                        rating_count: row.get("rating_count")?,
                    })
                },
            )
            .optional()?;
        Ok(aggregate)
    }
}

fn parse_evaluation_row(row: &Row<'_>) -> rusqlite::Result<RepoResult<Evaluation>> {
    let course_id: CourseId = row.get("course_id")?;
    let student: String = row.get("student")?;
    let rating: i64 = row.get("rating")?;
    let commentary: String = row.get("commentary")?;
    let submitted_at: i64 = row.get("submitted_at")?;

    let parsed_rating = u8::try_from(rating).ok().filter(|r| rating_in_range(*r));
    Ok(match parsed_rating {
        Some(rating) => Ok(Evaluation {
            course_id,
            student: Identity::new(student),
            rating,
            commentary,
            submitted_at,
        }),
        None => Err(RepoError::InvalidData(format!(
            "invalid rating value `{rating}` in evaluations.rating"
        ))),
    })
}
