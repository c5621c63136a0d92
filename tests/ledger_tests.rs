mod common;
use common::{STUDENT, TestDb, cached_count, configure, ledger_rows};

use chrono::{DateTime, Local};
use rattendance::core::changes::ChangeHub;
use rattendance::core::ledger::Ledger;
use rattendance::db::store::{AttendanceStore, Delta};
use rattendance::errors::AppError;
use rattendance::export::{ExportFormat, ExportLogic};
use rusqlite::params;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_record_appends_log_and_increments_count() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 10);

    let log = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", Some("lab session"))
        .expect("record");

    assert_eq!(log.subject, "CN");
    assert_eq!(log.student_id, STUDENT);
    assert_eq!(log.note.as_deref(), Some("lab session"));
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 1);
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 1);
}

#[test]
fn test_subject_code_is_case_insensitive() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "cn", 10);

    let log = Ledger::record_attendance(&mut pool, &hub, STUDENT, " cn ", None).expect("record");
    assert_eq!(log.subject, "CN");
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 1);
}

#[test]
fn test_record_without_totals_row_is_not_configured() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();

    let err = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap_err();
    assert!(matches!(err, AppError::NotConfigured(ref s) if s == "CN"));
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 0);
}

#[test]
fn test_cap_is_enforced_and_state_unchanged() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 5);

    for _ in 0..5 {
        Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).expect("record");
    }

    let err = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap_err();
    assert!(matches!(
        err,
        AppError::CapacityReached {
            count: 5,
            total: 5,
            ..
        }
    ));
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 5);
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 5);
}

#[test]
fn test_uncapped_subject_accepts_any_number() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "DB", 0);

    for _ in 0..25 {
        Ledger::record_attendance(&mut pool, &hub, STUDENT, "DB", None).expect("record");
    }
    assert_eq!(cached_count(&pool, STUDENT, "DB"), 25);
}

#[test]
fn test_note_longer_than_280_chars_is_rejected() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 0);

    let long = "é".repeat(281);
    let err = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", Some(&long)).unwrap_err();
    assert!(matches!(err, AppError::InvalidValue(_)));
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 0);

    let exact = "é".repeat(280);
    let log = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", Some(&exact))
        .expect("280 chars fit");
    assert_eq!(log.note.map(|n| n.chars().count()), Some(280));
}

#[test]
fn test_blank_note_is_stored_as_none() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 0);

    let log = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", Some("   ")).unwrap();
    assert_eq!(log.note, None);
}

#[test]
fn test_round_trip_restores_previous_count() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "OS", 12);

    Ledger::record_attendance(&mut pool, &hub, STUDENT, "OS", None).unwrap();
    Ledger::record_attendance(&mut pool, &hub, STUDENT, "OS", None).unwrap();
    let before = cached_count(&pool, STUDENT, "OS");

    let log = Ledger::record_attendance(&mut pool, &hub, STUDENT, "OS", None).unwrap();
    let removed = Ledger::delete_attendance(&mut pool, &hub, STUDENT, log.id).unwrap();

    assert_eq!(removed.id, log.id);
    assert_eq!(cached_count(&pool, STUDENT, "OS"), before);
    assert_eq!(ledger_rows(&pool, STUDENT, "OS"), before);
}

#[test]
fn test_delete_missing_record_is_not_found() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();

    let err = Ledger::delete_attendance(&mut pool, &hub, STUDENT, 999).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_delete_record_of_another_student_is_not_found() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, "bob", "CN", 10);

    let log = Ledger::record_attendance(&mut pool, &hub, "bob", "CN", None).unwrap();

    let err = Ledger::delete_attendance(&mut pool, &hub, STUDENT, log.id).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(cached_count(&pool, "bob", "CN"), 1);
    assert_eq!(ledger_rows(&pool, "bob", "CN"), 1);
}

#[test]
fn test_delete_with_zero_count_floors_at_zero() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 10);

    let log = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();

    // Simulate an out-of-sync counter.
    pool.conn
        .execute(
            "UPDATE subject_totals SET count = 0 WHERE student_id = ?1 AND subject = 'CN'",
            params![STUDENT],
        )
        .unwrap();

    Ledger::delete_attendance(&mut pool, &hub, STUDENT, log.id).expect("delete");
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 0);
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 0);
}

#[test]
fn test_increment_total_clamps_and_caps() {
    let db = TestDb::new();
    let mut pool = db.open();
    configure(&mut pool, STUDENT, "CN", 1);

    pool.increment_total(STUDENT, "CN", Delta::Down).unwrap();
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 0);

    pool.increment_total(STUDENT, "CN", Delta::Up).unwrap();
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 1);

    let err = pool.increment_total(STUDENT, "CN", Delta::Up).unwrap_err();
    assert!(matches!(err, AppError::CapacityReached { .. }));

    let err = pool.increment_total(STUDENT, "OS", Delta::Up).unwrap_err();
    assert!(matches!(err, AppError::NotConfigured(_)));
}

#[test]
fn test_count_matches_ledger_after_mixed_sequence() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 6);
    configure(&mut pool, STUDENT, "DB", 0);

    let mut ids = Vec::new();
    for i in 0..20 {
        let subject = if i % 3 == 0 { "CN" } else { "DB" };
        match Ledger::record_attendance(&mut pool, &hub, STUDENT, subject, None) {
            Ok(log) => ids.push(log.id),
            Err(AppError::CapacityReached { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
        if i % 4 == 3 {
            let id = ids.remove(0);
            Ledger::delete_attendance(&mut pool, &hub, STUDENT, id).unwrap();
        }
        // deleting something already gone must not move the counter
        let _ = Ledger::delete_attendance(&mut pool, &hub, STUDENT, -1);

        for s in ["CN", "DB"] {
            assert_eq!(
                cached_count(&pool, STUDENT, s),
                ledger_rows(&pool, STUDENT, s),
                "drift on {s} after step {i}"
            );
        }
    }
}

#[test]
fn test_concurrent_records_do_not_lose_updates() {
    let db = TestDb::new();
    {
        let mut pool = db.open();
        configure(&mut pool, STUDENT, "CN", 10);
    }

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let path = db.path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut pool = rattendance::db::pool::DbPool::new(&path).unwrap();
                let hub = ChangeHub::new();
                barrier.wait();
                Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).map(|l| l.id)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.iter().all(|r| r.is_ok()), "{results:?}");

    let pool = db.open();
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 2);
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 2);
}

#[test]
fn test_concurrent_writers_respect_cap() {
    let db = TestDb::new();
    {
        let mut pool = db.open();
        configure(&mut pool, STUDENT, "CN", 5);
    }

    let workers = 4;
    let per_worker = 5;
    let barrier = Arc::new(Barrier::new(workers));
    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let path = db.path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut pool = rattendance::db::pool::DbPool::new(&path).unwrap();
                let hub = ChangeHub::new();
                barrier.wait();
                let mut ok = 0;
                for _ in 0..per_worker {
                    match Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None) {
                        Ok(_) => ok += 1,
                        Err(AppError::CapacityReached { .. }) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                ok
            })
        })
        .collect();

    let accepted: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(accepted, 5);

    let pool = db.open();
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 5);
    assert_eq!(ledger_rows(&pool, STUDENT, "CN"), 5);
}

#[test]
fn test_history_is_newest_first_and_filterable() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 0);
    configure(&mut pool, STUDENT, "OS", 0);

    let a = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();
    let b = Ledger::record_attendance(&mut pool, &hub, STUDENT, "OS", None).unwrap();
    let c = Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();

    let all = Ledger::history(&mut pool, STUDENT, None).unwrap();
    let ids: Vec<i64> = all.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);

    let cn = Ledger::history(&mut pool, STUDENT, Some("cn")).unwrap();
    assert_eq!(cn.len(), 2);
    assert!(cn.iter().all(|l| l.subject == "CN"));

    assert!(Ledger::history(&mut pool, "bob", None).unwrap().is_empty());
}

#[test]
fn test_recount_repairs_drift() {
    let db = TestDb::new();
    let mut pool = db.open();
    let hub = ChangeHub::new();
    configure(&mut pool, STUDENT, "CN", 10);
    configure(&mut pool, STUDENT, "OS", 10);

    for _ in 0..3 {
        Ledger::record_attendance(&mut pool, &hub, STUDENT, "CN", None).unwrap();
    }
    Ledger::record_attendance(&mut pool, &hub, STUDENT, "OS", None).unwrap();

    pool.conn
        .execute(
            "UPDATE subject_totals SET count = 7 WHERE student_id = ?1 AND subject = 'CN'",
            params![STUDENT],
        )
        .unwrap();

    let repairs = Ledger::recount(&mut pool, &hub, STUDENT).unwrap();
    assert_eq!(repairs.len(), 1);
    assert_eq!(repairs[0].subject, "CN");
    assert_eq!(repairs[0].cached, 7);
    assert_eq!(repairs[0].actual, 3);
    assert_eq!(cached_count(&pool, STUDENT, "CN"), 3);
    assert_eq!(cached_count(&pool, STUDENT, "OS"), 1);

    assert!(Ledger::recount(&mut pool, &hub, STUDENT).unwrap().is_empty());
}

fn at(rfc3339: &str) -> DateTime<Local> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Local)
}

#[test]
fn test_history_order_survives_offset_change() {
    let db = TestDb::new();
    let mut pool = db.open();
    configure(&mut pool, STUDENT, "CN", 0);

    // Autumn clock change: 02:50+02:00 is 00:50Z, 02:10+01:00 is 01:10Z.
    let later = pool
        .insert_log_and_increment(STUDENT, "CN", None, at("2025-10-26T02:10:00+01:00"))
        .unwrap();
    let earlier = pool
        .insert_log_and_increment(STUDENT, "CN", None, at("2025-10-26T02:50:00+02:00"))
        .unwrap();
    let after = pool
        .insert_log_and_increment(STUDENT, "CN", None, at("2025-10-26T01:30:00Z"))
        .unwrap();

    let ids: Vec<i64> = Ledger::history(&mut pool, STUDENT, None)
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![after.id, later.id, earlier.id]);

    let logs = Ledger::history(&mut pool, STUDENT, None).unwrap();
    assert_eq!(logs[2].date, at("2025-10-26T00:50:00Z"));

    let file = db.dir.path().join("ledger.json");
    let file = file.to_string_lossy().to_string();
    ExportLogic::export(&mut pool, STUDENT, None, ExportFormat::Json, &file, true).unwrap();
    let rows: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    let exported: Vec<i64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(exported, vec![earlier.id, later.id, after.id]);
}

#[test]
fn test_timestamps_are_stored_in_utc() {
    let db = TestDb::new();
    let mut pool = db.open();
    configure(&mut pool, STUDENT, "CN", 0);

    pool.insert_log_and_increment(STUDENT, "CN", None, at("2025-03-30T03:15:00+02:00"))
        .unwrap();

    let raw: String = pool
        .conn
        .query_row("SELECT date FROM attendance_logs", [], |r| r.get(0))
        .unwrap();
    assert_eq!(raw, "2025-03-30T01:15:00.000000Z");
}
