//! Domain model for the evaluation ledger.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep field bounds and their validators next to the records they guard.
//!
//! # Invariants
//! - Records reference courses by `CourseId` only; the catalog exclusively
//!   owns course data.
//! - No record type has a delete path; history is immutable.

pub mod course;
pub mod evaluation;
pub mod identity;
