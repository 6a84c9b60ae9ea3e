//! Transaction orchestrator for the evaluation ledger.
//!
//! # Responsibility
//! - Expose the five public mutations and the read-only queries.
//! - Validate every precondition before any write, in a fixed order.
//!
//! # Invariants
//! - Each mutation runs as one `Immediate` SQLite transaction spanning all
//!   four stores; either all of its writes commit or none do.
//! - The service owns the `Connection`, so operations against one ledger are
//!   serialized by construction.
//! - Every committed mutation advances the ledger height by exactly one;
//!   evaluations are stamped with the height of their own commit.

use crate::access::AccessPolicy;
use crate::model::course::{validate_course_name, Course, CourseId};
use crate::model::evaluation::{rating_in_range, validate_commentary, Aggregate, Evaluation};
use crate::model::identity::Identity;
use crate::repo::course_repo::{CourseRepository, RepoError, SqliteCourseRepository};
use crate::repo::enrollment_repo::{EnrollmentRepository, SqliteEnrollmentRepository};
use crate::repo::evaluation_repo::{EvaluationRepository, SqliteEvaluationRepository};
use crate::repo::{advance_counter, counter_value, ensure_schema_ready, COUNTER_LEDGER_HEIGHT};
use log::info;
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failure taxonomy of the public operations.
///
/// All variants are terminal and synchronous; no operation partially applies
/// its effects before failing.
#[derive(Debug)]
pub enum LedgerError {
    /// Caller lacks the role required by the operation.
    PermissionDenied { caller: Identity },
    /// Referenced course does not exist.
    CourseNotFound(CourseId),
    /// Text length/format violation.
    InvalidInput(String),
    /// Rating outside the accepted 1..=5 range.
    RatingOutOfRange(u8),
    /// An evaluation for this (course, student) pair already exists.
    DuplicateSubmission {
        course_id: CourseId,
        student: Identity,
    },
    /// Submitting student has no active enrollment for the course.
    NotEnrolled {
        course_id: CourseId,
        student: Identity,
    },
    /// Course is not accepting new evaluations.
    EvaluationsClosed(CourseId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied { caller } => {
                write!(f, "permission denied for caller `{caller}`")
            }
            Self::CourseNotFound(course_id) => write!(f, "course not found: {course_id}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::RatingOutOfRange(rating) => {
                write!(f, "rating {rating} is outside the accepted range")
            }
            Self::DuplicateSubmission { course_id, student } => write!(
                f,
                "student `{student}` already submitted an evaluation for course {course_id}"
            ),
            Self::NotEnrolled { course_id, student } => {
                write!(f, "student `{student}` is not enrolled in course {course_id}")
            }
            Self::EvaluationsClosed(course_id) => {
                write!(f, "course {course_id} is not accepting evaluations")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LedgerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CourseNotFound(course_id) => Self::CourseNotFound(course_id),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Public operation surface over the four ledger stores.
pub struct LedgerService {
    conn: Connection,
    access: AccessPolicy,
}

impl LedgerService {
    /// Builds a ledger over a migrated connection, capturing the
    /// administrator identity for the service's lifetime.
    ///
    /// # Errors
    /// - Schema-readiness failures when the connection was not opened via
    ///   `db::open_db` / `db::open_db_in_memory`.
    pub fn new(conn: Connection, admin: Identity) -> LedgerResult<Self> {
        ensure_schema_ready(&conn)?;
        Ok(Self {
            conn,
            access: AccessPolicy::new(admin),
        })
    }

    /// Returns the authorization predicates bound to this ledger.
    pub fn access(&self) -> &AccessPolicy {
        &self.access
    }

    /// Creates a course with the next sequential id.
    ///
    /// The caller becomes the initial instructor and the course starts
    /// accepting evaluations; a zeroed aggregate is created alongside it.
    pub fn create_course(&mut self, caller: &Identity, name: &str) -> LedgerResult<CourseId> {
        if !self.access.is_admin(caller) {
            return Err(LedgerError::PermissionDenied {
                caller: caller.clone(),
            });
        }
        validate_course_name(name).map_err(|err| LedgerError::InvalidInput(err.to_string()))?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let course_id = {
            let courses = SqliteCourseRepository::new(&tx);
            let evaluations = SqliteEvaluationRepository::new(&tx);

            let course_id = courses.allocate_course_id()?;
            courses.insert_course(&Course {
                id: course_id,
                name: name.to_string(),
                instructor: caller.clone(),
                accepting: true,
            })?;
            evaluations.insert_aggregate(&Aggregate::zeroed(course_id))?;
            advance_counter(&tx, COUNTER_LEDGER_HEIGHT)?;
            course_id
        };
        tx.commit()?;

        info!("event=course_create module=ledger status=ok course_id={course_id}");
        Ok(course_id)
    }

    /// Replaces a course's assigned instructor.
    ///
    /// Only the administrator may reassign; the current instructor may not
    /// hand the course to someone else.
    pub fn reassign_instructor(
        &mut self,
        caller: &Identity,
        course_id: CourseId,
        new_instructor: &Identity,
    ) -> LedgerResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let courses = SqliteCourseRepository::new(&tx);
            courses
                .get_course(course_id)?
                .ok_or(LedgerError::CourseNotFound(course_id))?;
            if !self.access.is_admin(caller) {
                return Err(LedgerError::PermissionDenied {
                    caller: caller.clone(),
                });
            }
            courses.set_instructor(course_id, new_instructor)?;
            advance_counter(&tx, COUNTER_LEDGER_HEIGHT)?;
        }
        tx.commit()?;

        info!("event=instructor_reassign module=ledger status=ok course_id={course_id}");
        Ok(())
    }

    /// Opens or closes a course for new evaluations.
    pub fn set_acceptance_status(
        &mut self,
        caller: &Identity,
        course_id: CourseId,
        accepting: bool,
    ) -> LedgerResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let courses = SqliteCourseRepository::new(&tx);
            let course = courses
                .get_course(course_id)?
                .ok_or(LedgerError::CourseNotFound(course_id))?;
            if !self.access.can_manage_course(caller, Some(&course)) {
                return Err(LedgerError::PermissionDenied {
                    caller: caller.clone(),
                });
            }
            courses.set_accepting(course_id, accepting)?;
            advance_counter(&tx, COUNTER_LEDGER_HEIGHT)?;
        }
        tx.commit()?;

        info!(
            "event=acceptance_set module=ledger status=ok course_id={course_id} accepting={accepting}"
        );
        Ok(())
    }

    /// Marks a student as eligible to evaluate a course.
    ///
    /// Idempotent: re-enrolling an already-enrolled student succeeds
    /// silently.
    pub fn enroll(
        &mut self,
        caller: &Identity,
        course_id: CourseId,
        student: &Identity,
    ) -> LedgerResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let courses = SqliteCourseRepository::new(&tx);
            let enrollments = SqliteEnrollmentRepository::new(&tx);

            let course = courses
                .get_course(course_id)?
                .ok_or(LedgerError::CourseNotFound(course_id))?;
            if !self.access.can_manage_course(caller, Some(&course)) {
                return Err(LedgerError::PermissionDenied {
                    caller: caller.clone(),
                });
            }
            enrollments.upsert_enrollment(course_id, student)?;
            advance_counter(&tx, COUNTER_LEDGER_HEIGHT)?;
        }
        tx.commit()?;

        info!("event=enroll module=ledger status=ok course_id={course_id}");
        Ok(())
    }

    /// Submits the caller's one immutable evaluation for a course.
    ///
    /// Preconditions are checked in a fixed order (course exists, accepting,
    /// enrolled, rating range, no duplicate, commentary bounds); the first
    /// failing check wins and nothing is written. On success the evaluation
    /// insert and the aggregate update commit together.
    pub fn submit_evaluation(
        &mut self,
        caller: &Identity,
        course_id: CourseId,
        rating: u8,
        commentary: &str,
    ) -> LedgerResult<Evaluation> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let evaluation = {
            let courses = SqliteCourseRepository::new(&tx);
            let enrollments = SqliteEnrollmentRepository::new(&tx);
            let evaluations = SqliteEvaluationRepository::new(&tx);

            let course = courses
                .get_course(course_id)?
                .ok_or(LedgerError::CourseNotFound(course_id))?;
            if !course.accepting {
                return Err(LedgerError::EvaluationsClosed(course_id));
            }
            let enrolled = enrollments
                .get_enrollment(course_id, caller)?
                .is_some_and(|enrollment| enrollment.enrolled);
            if !enrolled {
                return Err(LedgerError::NotEnrolled {
                    course_id,
                    student: caller.clone(),
                });
            }
            if !rating_in_range(rating) {
                return Err(LedgerError::RatingOutOfRange(rating));
            }
            if evaluations.get_evaluation(course_id, caller)?.is_some() {
                return Err(LedgerError::DuplicateSubmission {
                    course_id,
                    student: caller.clone(),
                });
            }
            validate_commentary(commentary)
                .map_err(|err| LedgerError::InvalidInput(err.to_string()))?;

            let height = advance_counter(&tx, COUNTER_LEDGER_HEIGHT)?;
            let evaluation = Evaluation {
                course_id,
                student: caller.clone(),
                rating,
                commentary: commentary.to_string(),
                submitted_at: height,
            };
            evaluations.insert_evaluation(&evaluation)?;
            evaluations.apply_rating(course_id, rating)?;
            evaluation
        };
        tx.commit()?;

        info!(
            "event=evaluation_submit module=ledger status=ok course_id={course_id} rating={rating} height={}",
            evaluation.submitted_at
        );
        Ok(evaluation)
    }

    /// Gets one course; absence is a valid "not found" result.
    pub fn get_course(&self, course_id: CourseId) -> LedgerResult<Option<Course>> {
        Ok(SqliteCourseRepository::new(&self.conn).get_course(course_id)?)
    }

    /// Returns whether the student holds an active enrollment. Absence of a
    /// record is `false`, not an error.
    pub fn is_enrolled(&self, course_id: CourseId, student: &Identity) -> LedgerResult<bool> {
        let enrollment =
            SqliteEnrollmentRepository::new(&self.conn).get_enrollment(course_id, student)?;
        Ok(enrollment.is_some_and(|enrollment| enrollment.enrolled))
    }

    /// Gets one evaluation; absence is a valid result.
    pub fn get_evaluation(
        &self,
        course_id: CourseId,
        student: &Identity,
    ) -> LedgerResult<Option<Evaluation>> {
        Ok(SqliteEvaluationRepository::new(&self.conn).get_evaluation(course_id, student)?)
    }

    /// Floor integer average of the course's ratings, 0 when the course has
    /// no evaluations or no aggregate at all.
    pub fn average_rating(&self, course_id: CourseId) -> LedgerResult<i64> {
        let aggregate = SqliteEvaluationRepository::new(&self.conn).get_aggregate(course_id)?;
        Ok(aggregate.map_or(0, |aggregate| aggregate.average()))
    }

    /// Number of evaluations recorded for the course, 0 when none exist.
    pub fn evaluation_count(&self, course_id: CourseId) -> LedgerResult<i64> {
        let aggregate = SqliteEvaluationRepository::new(&self.conn).get_aggregate(course_id)?;
        Ok(aggregate.map_or(0, |aggregate| aggregate.rating_count))
    }

    /// True iff `caller` is the fixed administrator.
    pub fn is_admin(&self, caller: &Identity) -> bool {
        self.access.is_admin(caller)
    }

    /// True iff the course exists and `caller` is its assigned instructor.
    pub fn is_instructor_of(
        &self,
        caller: &Identity,
        course_id: CourseId,
    ) -> LedgerResult<bool> {
        let course = self.get_course(course_id)?;
        Ok(self.access.is_instructor_of(caller, course.as_ref()))
    }

    /// Current logical clock value; advances once per committed mutation.
    pub fn ledger_height(&self) -> LedgerResult<i64> {
        Ok(counter_value(&self.conn, COUNTER_LEDGER_HEIGHT)?)
    }
}
