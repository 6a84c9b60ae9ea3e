//! Core domain logic for the course evaluation ledger.
//! This crate is the single source of truth for catalog, enrollment,
//! evaluation and aggregate invariants.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::AccessPolicy;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::course::{Course, CourseId, CourseNameError, MAX_COURSE_NAME_CHARS};
pub use model::evaluation::{
    Aggregate, CommentaryError, Enrollment, Evaluation, MAX_COMMENTARY_CHARS, MAX_RATING,
    MIN_RATING,
};
pub use model::identity::Identity;
pub use repo::course_repo::{RepoError, RepoResult};
pub use service::ledger_service::{LedgerError, LedgerResult, LedgerService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
