//! Enrollment, evaluation and aggregate domain models.
//!
//! # Responsibility
//! - Define the per-(course, student) records and the derived rating
//!   aggregate, with their field bounds.
//!
//! # Invariants
//! - At most one `Evaluation` exists per (course, student) pair; once
//!   written it is immutable, there is no edit or delete path.
//! - `Aggregate.rating_count` equals the number of evaluations for the
//!   course and `rating_sum` equals the sum of their ratings after every
//!   completed operation.

use crate::model::course::CourseId;
use crate::model::identity::Identity;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;
/// Upper bound for evaluation commentary, in characters.
pub const MAX_COMMENTARY_CHARS: usize = 500;

/// Per-(course, student) eligibility flag.
///
/// Enrollment is created or overwritten by the enroll operation and never
/// revoked; absence of a record means "not enrolled".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub student: Identity,
    pub enrolled: bool,
}

/// One student's immutable rating + commentary for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub course_id: CourseId,
    pub student: Identity,
    /// Integer rating in `MIN_RATING..=MAX_RATING`.
    pub rating: u8,
    /// Commentary text, 1..=500 characters.
    pub commentary: String,
    /// Ledger height at write time.
    pub submitted_at: i64,
}

/// Derived running sum/count of ratings for one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub course_id: CourseId,
    pub rating_sum: i64,
    pub rating_count: i64,
}

impl Aggregate {
    /// Zeroed aggregate created alongside a new course.
    pub fn zeroed(course_id: CourseId) -> Self {
        Self {
            course_id,
            rating_sum: 0,
            rating_count: 0,
        }
    }

    /// Floor integer average, 0 when no evaluations exist.
    ///
    /// Integer division is deliberate; the ledger never reports fractional
    /// or rounded averages.
    pub fn average(&self) -> i64 {
        if self.rating_count == 0 {
            0
        } else {
            self.rating_sum / self.rating_count
        }
    }
}

/// Commentary bound violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentaryError {
    Empty,
    TooLong { chars: usize, max: usize },
}

impl Display for CommentaryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "commentary must not be empty"),
            Self::TooLong { chars, max } => {
                write!(f, "commentary has {chars} characters, maximum is {max}")
            }
        }
    }
}

impl Error for CommentaryError {}

/// Validates evaluation commentary against its bounds.
pub fn validate_commentary(commentary: &str) -> Result<(), CommentaryError> {
    let chars = commentary.chars().count();
    if chars == 0 {
        return Err(CommentaryError::Empty);
    }
    if chars > MAX_COMMENTARY_CHARS {
        return Err(CommentaryError::TooLong {
            chars,
            max: MAX_COMMENTARY_CHARS,
        });
    }
    Ok(())
}

/// Returns whether a rating lies in the accepted range.
pub fn rating_in_range(rating: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
