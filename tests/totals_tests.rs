mod common;
use common::{STUDENT, TestDb, cached_count, configure, ledger_rows};

use rattendance::core::changes::ChangeHub;
use rattendance::core::ledger::Ledger;
use rattendance::core::totals::Totals;
use rattendance::errors::AppError;
use rattendance::utils::formatting::count_label;

#[test]
fn test_add_subject_uses_catalog_default_total() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();

    let row = Totals::add_subject(&mut pool, &hub, STUDENT, "os", None).unwrap();
    assert_eq!(row.subject, "OS");
    assert_eq!(row.count, 0);
    assert_eq!(row.total, 12);

    let row = Totals::add_subject(&mut pool, &hub, STUDENT, "CN", Some(4)).unwrap();
    assert_eq!(row.total, 4);
}

#[test]
fn test_add_subject_twice_is_already_exists() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 10);

    let err = Totals::add_subject(&mut pool, &hub, STUDENT, "cn", None).unwrap_err();
    assert!(matches!(err, AppError::AlreadyExists(_)));

    // another student may still track it
    Totals::add_subject(&mut pool, &hub, "bob", "CN", None).expect("bob adds CN");
}

#[test]
fn test_add_subject_outside_catalog_is_unknown() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();

    let err = Totals::add_subject(&mut pool, &hub, STUDENT, "MATH", None).unwrap_err();
    assert!(matches!(err, AppError::UnknownSubject(ref s) if s == "MATH"));
}

#[test]
fn test_add_subject_rejects_negative_total() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();

    let err = Totals::add_subject(&mut pool, &hub, STUDENT, "CN", Some(-2)).unwrap_err();
    assert!(matches!(err, AppError::InvalidValue(_)));
    assert!(Totals::list_totals(&mut pool, STUDENT).unwrap().is_empty());
}

#[test]
fn test_lowering_total_below_count_keeps_count() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 10);

    for _ in 0..5 {
        Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();
    }

    Totals::set_total(&mut pool, &hub, STUDENT, "CN", 3).unwrap();

    let rows = Totals::list_totals(&mut pool, STUDENT).unwrap();
    let cn = &rows[0];
    assert_eq!(cn.count, 5);
    assert_eq!(cn.total, 3);

    let p = cn.project();
    assert_eq!(p.capped, 3);
    assert_eq!(p.percent, Some(100));
    assert_eq!(count_label(cn), "3/3");

    // over the new cap, so marking is refused
    let err = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap_err();
    assert!(matches!(err, AppError::CapacityReached { .. }));
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 5);
}

#[test]
fn test_set_total_to_zero_uncaps() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 1);

    Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();
    Totals::set_total(&mut pool, &hub, STUDENT, "CN", 0).unwrap();
    Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();

    assert_eq!(cached_count(&pool, STUDENT, "CN"), 2);
    let rows = Totals::list_totals(&mut pool, STUDENT).unwrap();
    assert_eq!(rows[0].project().percent, None);
}

#[test]
fn test_set_total_rejects_invalid_input() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 10);

    for raw in ["-1", "abc", "2.5", ""] {
        let err = Totals::set_total_str(&mut pool, &hub, STUDENT, "CN", raw).unwrap_err();
        assert!(matches!(err, AppError::InvalidValue(_)), "{raw:?}");
    }
    let rows = Totals::list_totals(&mut pool, STUDENT).unwrap();
    assert_eq!(rows[0].total, 10);

    Totals::set_total_str(&mut pool, &hub, STUDENT, "CN", " 14 ").unwrap();
    let rows = Totals::list_totals(&mut pool, STUDENT).unwrap();
    assert_eq!(rows[0].total, 14);
}

#[test]
fn test_set_total_on_unconfigured_subject() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();

    let err = Totals::set_total(&mut pool, &hub, STUDENT, "CN", 5).unwrap_err();
    assert!(matches!(err, AppError::NotConfigured(_)));
}

#[test]
fn test_remove_subject_deletes_its_records() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 10);
    configure(&mut pool, STUDENT, "OS", 10);

    for _ in 0..3 {
        Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();
    }
    Ledger::record_attendance(&mut pool, &hub, STUDENT, "OS", None).unwrap();

    let removed = Totals::remove_subject(&mut pool, &hub, STUDENT, "cn").unwrap();
    assert_eq!(removed, 3);
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 0);
    assert_eq!(ledger_rows(&pool, STUDENT, "OS"), 1);

    let subjects: Vec<String> = Totals::list_totals(&mut pool, STUDENT)
        .unwrap()
        .into_iter()
        .map(|t| t.subject)
        .collect();
    assert_eq!(subjects, vec!["OS"]);

    let err = Totals::remove_subject(&mut pool, &hub, STUDENT, "CN").unwrap_err();
    assert!(matches!(err, AppError::NotConfigured(_)));
}

#[test]
fn test_list_totals_is_per_student_and_sorted() {
    let db = TestDb::new();
    let mut pool = db.open();
    configure(&mut pool, STUDENT, "OS", 12);
    configure(&mut pool, STUDENT, "CN", 10);
    configure(&mut pool, STUDENT, "DB", 0);
    configure(&mut pool, "bob", "CN", 10);

    let subjects: Vec<String> = Totals::list_totals(&mut pool, STUDENT)
        .unwrap()
        .into_iter()
        .map(|t| t.subject)
        .collect();
    assert_eq!(subjects, vec!["CN", "DB", "OS"]);

    assert_eq!(Totals::list_totals(&mut pool, "bob").unwrap().len(), 1);
    assert!(Totals::list_totals(&mut pool, "nobody").unwrap().is_empty());
}
