use evalledger_core::db::open_db_in_memory;
use evalledger_core::{Identity, LedgerError, LedgerService, MAX_COMMENTARY_CHARS};

fn admin() -> Identity {
    Identity::new("admin")
}

fn ledger() -> LedgerService {
    let conn = open_db_in_memory().unwrap();
    LedgerService::new(conn, admin()).unwrap()
}

fn ledger_with_enrolled_student() -> (LedgerService, i64, Identity) {
    let mut ledger = ledger();
    let course_id = ledger.create_course(&admin(), "Compilers").unwrap();
    let student = Identity::new("s1");
    ledger.enroll(&admin(), course_id, &student).unwrap();
    (ledger, course_id, student)
}

#[test]
fn submit_then_duplicate_scenario() {
    let (mut ledger, course_id, student) = ledger_with_enrolled_student();

    let evaluation = ledger
        .submit_evaluation(&student, course_id, 5, "Great")
        .unwrap();
    assert_eq!(evaluation.rating, 5);
    assert_eq!(evaluation.commentary, "Great");
    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 1);
    assert_eq!(ledger.average_rating(course_id).unwrap(), 5);

    let err = ledger
        .submit_evaluation(&student, course_id, 4, "Changed my mind")
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateSubmission { .. }));
    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 1);
    assert_eq!(ledger.average_rating(course_id).unwrap(), 5);

    let stored = ledger.get_evaluation(course_id, &student).unwrap().unwrap();
    assert_eq!(stored.rating, 5);
    assert_eq!(stored.commentary, "Great");
}

#[test]
fn closed_course_rejects_submission() {
    let (mut ledger, course_id, student) = ledger_with_enrolled_student();
    ledger.set_acceptance_status(&admin(), course_id, false).unwrap();

    let err = ledger
        .submit_evaluation(&student, course_id, 4, "Too late")
        .unwrap_err();
    assert!(matches!(err, LedgerError::EvaluationsClosed(id) if id == course_id));
    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 0);
    assert!(ledger.get_evaluation(course_id, &student).unwrap().is_none());
}

#[test]
fn unknown_course_wins_over_every_other_failure() {
    let mut ledger = ledger();
    let err = ledger
        .submit_evaluation(&Identity::new("s1"), 99, 9, "")
        .unwrap_err();
    assert!(matches!(err, LedgerError::CourseNotFound(99)));
}

#[test]
fn closed_is_checked_before_enrollment() {
    let mut ledger = ledger();
    let course_id = ledger.create_course(&admin(), "Order").unwrap();
    ledger.set_acceptance_status(&admin(), course_id, false).unwrap();

    // Caller is not enrolled either; the acceptance check fires first.
    let err = ledger
        .submit_evaluation(&Identity::new("outsider"), course_id, 3, "hi")
        .unwrap_err();
    assert!(matches!(err, LedgerError::EvaluationsClosed(_)));
}

#[test]
fn unenrolled_student_is_rejected_before_rating_validation() {
    let mut ledger = ledger();
    let course_id = ledger.create_course(&admin(), "Order").unwrap();

    let err = ledger
        .submit_evaluation(&Identity::new("outsider"), course_id, 99, "hi")
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotEnrolled { .. }));
}

#[test]
fn rating_out_of_range_fails_before_any_store_is_touched() {
    let (mut ledger, course_id, student) = ledger_with_enrolled_student();

    for rating in [0u8, 6u8] {
        let err = ledger
            .submit_evaluation(&student, course_id, rating, "fine")
            .unwrap_err();
        assert!(matches!(err, LedgerError::RatingOutOfRange(r) if r == rating));
    }
    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 0);
    assert!(ledger.get_evaluation(course_id, &student).unwrap().is_none());
}

#[test]
fn rating_is_validated_before_duplicate_detection() {
    let (mut ledger, course_id, student) = ledger_with_enrolled_student();
    ledger
        .submit_evaluation(&student, course_id, 5, "Great")
        .unwrap();

    let err = ledger
        .submit_evaluation(&student, course_id, 6, "again")
        .unwrap_err();
    assert!(matches!(err, LedgerError::RatingOutOfRange(6)));
}

#[test]
fn commentary_bounds_are_checked_last() {
    let (mut ledger, course_id, student) = ledger_with_enrolled_student();

    let empty = ledger
        .submit_evaluation(&student, course_id, 4, "")
        .unwrap_err();
    assert!(matches!(empty, LedgerError::InvalidInput(_)));

    let overlong = "x".repeat(MAX_COMMENTARY_CHARS + 1);
    let too_long = ledger
        .submit_evaluation(&student, course_id, 4, &overlong)
        .unwrap_err();
    assert!(matches!(too_long, LedgerError::InvalidInput(_)));

    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 0);

    // A rejected commentary does not consume the one-submission slot.
    let at_bound = "x".repeat(MAX_COMMENTARY_CHARS);
    ledger
        .submit_evaluation(&student, course_id, 4, &at_bound)
        .unwrap();
    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 1);
}

#[test]
fn average_uses_floor_integer_division() {
    let mut ledger = ledger();
    let course_id = ledger.create_course(&admin(), "Averages").unwrap();
    let ratings = [(Identity::new("s1"), 5u8), (Identity::new("s2"), 4u8)];
    for (student, rating) in &ratings {
        ledger.enroll(&admin(), course_id, student).unwrap();
        ledger
            .submit_evaluation(student, course_id, *rating, "ok")
            .unwrap();
    }

    // (5 + 4) / 2 floors to 4.
    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 2);
    assert_eq!(ledger.average_rating(course_id).unwrap(), 4);
}

#[test]
fn aggregates_track_per_course_counts() {
    let mut ledger = ledger();
    let first = ledger.create_course(&admin(), "First").unwrap();
    let second = ledger.create_course(&admin(), "Second").unwrap();

    for name in ["s1", "s2", "s3"] {
        let student = Identity::new(name);
        ledger.enroll(&admin(), first, &student).unwrap();
        ledger.submit_evaluation(&student, first, 3, "meh").unwrap();
    }
    let lone = Identity::new("s4");
    ledger.enroll(&admin(), second, &lone).unwrap();
    ledger.submit_evaluation(&lone, second, 1, "bad").unwrap();

    assert_eq!(ledger.evaluation_count(first).unwrap(), 3);
    assert_eq!(ledger.average_rating(first).unwrap(), 3);
    assert_eq!(ledger.evaluation_count(second).unwrap(), 1);
    assert_eq!(ledger.average_rating(second).unwrap(), 1);
    assert_eq!(ledger.evaluation_count(77).unwrap(), 0);
    assert_eq!(ledger.average_rating(77).unwrap(), 0);
}

#[test]
fn evaluations_are_stamped_with_increasing_ledger_height() {
    let mut ledger = ledger();
    let course_id = ledger.create_course(&admin(), "Heights").unwrap();
    let s1 = Identity::new("s1");
    let s2 = Identity::new("s2");
    ledger.enroll(&admin(), course_id, &s1).unwrap();
    ledger.enroll(&admin(), course_id, &s2).unwrap();

    let first = ledger.submit_evaluation(&s1, course_id, 5, "a").unwrap();
    let second = ledger.submit_evaluation(&s2, course_id, 4, "b").unwrap();

    assert!(first.submitted_at > 0);
    assert!(second.submitted_at > first.submitted_at);
    assert_eq!(ledger.ledger_height().unwrap(), second.submitted_at);
}

#[test]
fn closing_a_course_keeps_past_evaluations_and_aggregates() {
    let (mut ledger, course_id, student) = ledger_with_enrolled_student();
    ledger
        .submit_evaluation(&student, course_id, 5, "Great")
        .unwrap();

    ledger.set_acceptance_status(&admin(), course_id, false).unwrap();

    assert!(ledger.get_evaluation(course_id, &student).unwrap().is_some());
    assert_eq!(ledger.evaluation_count(course_id).unwrap(), 1);
    assert_eq!(ledger.average_rating(course_id).unwrap(), 5);
}

#[test]
fn failed_submission_leaves_ledger_height_untouched() {
    let (mut ledger, course_id, student) = ledger_with_enrolled_student();
    let height_before = ledger.ledger_height().unwrap();

    let _ = ledger.submit_evaluation(&student, course_id, 6, "oops");
    assert_eq!(ledger.ledger_height().unwrap(), height_before);
}
