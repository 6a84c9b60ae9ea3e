//! Role predicates gating every catalog mutation.
//!
//! # Responsibility
//! - Answer "is caller privileged" questions for the orchestrator.
//!
//! # Invariants
//! - The administrator identity is fixed at construction and immutable for
//!   the policy's lifetime.
//! - Predicates are pure: no side effects, no storage access. Callers pass
//!   in the already-resolved course record; a missing course answers
//!   `false`, never an error.

use crate::model::course::Course;
use crate::model::identity::Identity;

/// Pure authorization predicates over the fixed administrator and the
/// course catalog.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    admin: Identity,
}

impl AccessPolicy {
    /// Captures the administrator identity once, at system initialization.
    pub fn new(admin: Identity) -> Self {
        Self { admin }
    }

    /// Returns the fixed administrator identity.
    pub fn admin(&self) -> &Identity {
        &self.admin
    }

    /// True iff `caller` is the fixed administrator.
    pub fn is_admin(&self, caller: &Identity) -> bool {
        caller == &self.admin
    }

    /// True iff the course exists and its assigned instructor is `caller`.
    pub fn is_instructor_of(&self, caller: &Identity, course: Option<&Course>) -> bool {
        course.is_some_and(|course| &course.instructor == caller)
    }

    /// True iff `caller` is the administrator or the course's instructor.
    pub fn can_manage_course(&self, caller: &Identity, course: Option<&Course>) -> bool {
        self.is_admin(caller) || self.is_instructor_of(caller, course)
    }
}

#[cfg(test)]
mod tests {
    use super::AccessPolicy;
    use crate::model::course::Course;
    use crate::model::identity::Identity;

    fn policy() -> AccessPolicy {
        AccessPolicy::new(Identity::new("admin"))
    }

    fn course(instructor: &str) -> Course {
        Course {
            id: 1,
            name: "Algorithms".to_string(),
            instructor: Identity::new(instructor),
            accepting: true,
        }
    }

    #[test]
    fn only_the_fixed_identity_is_admin() {
        let policy = policy();
        assert!(policy.is_admin(&Identity::new("admin")));
        assert!(!policy.is_admin(&Identity::new("Admin")));
        assert!(!policy.is_admin(&Identity::new("prof")));
    }

    #[test]
    fn instructor_check_matches_assigned_identity_only() {
        let policy = policy();
        let course = course("prof");
        assert!(policy.is_instructor_of(&Identity::new("prof"), Some(&course)));
        assert!(!policy.is_instructor_of(&Identity::new("other"), Some(&course)));
    }

    #[test]
    fn missing_course_is_false_not_an_error() {
        let policy = policy();
        assert!(!policy.is_instructor_of(&Identity::new("prof"), None));
        // Admin can manage regardless of course resolution.
        assert!(policy.can_manage_course(&Identity::new("admin"), None));
    }

    #[test]
    fn manage_allows_admin_or_assigned_instructor() {
        let policy = policy();
        let course = course("prof");
        assert!(policy.can_manage_course(&Identity::new("admin"), Some(&course)));
        assert!(policy.can_manage_course(&Identity::new("prof"), Some(&course)));
        assert!(!policy.can_manage_course(&Identity::new("student"), Some(&course)));
    }
}
