//! Course catalog domain model.
//!
//! # Responsibility
//! - Define the canonical course record and its display-name bounds.
//!
//! # Invariants
//! - `id` is allocated by the catalog counter, strictly monotonic, never
//!   reused.
//! - Courses are never deleted; other stores hold weak references by id.

use crate::model::identity::Identity;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Monotonic catalog identifier, first allocated value is 1.
pub type CourseId = i64;

/// Upper bound for course display names, in characters.
pub const MAX_COURSE_NAME_CHARS: usize = 100;

/// Canonical catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Catalog id allocated at creation.
    pub id: CourseId,
    /// Display name, 1..=100 characters.
    pub name: String,
    /// Currently assigned instructor.
    pub instructor: Identity,
    /// Whether new evaluations are accepted right now.
    pub accepting: bool,
}

/// Display-name bound violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseNameError {
    Empty,
    TooLong { chars: usize, max: usize },
}

impl Display for CourseNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "course name must not be empty"),
            Self::TooLong { chars, max } => {
                write!(f, "course name has {chars} characters, maximum is {max}")
            }
        }
    }
}

impl Error for CourseNameError {}

/// Validates a course display name against catalog bounds.
pub fn validate_course_name(name: &str) -> Result<(), CourseNameError> {
    let chars = name.chars().count();
    if chars == 0 {
        return Err(CourseNameError::Empty);
    }
    if chars > MAX_COURSE_NAME_CHARS {
        return Err(CourseNameError::TooLong {
            chars,
            max: MAX_COURSE_NAME_CHARS,
        });
    }
    Ok(())
}
