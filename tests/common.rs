#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rattendance::core::changes::ChangeHub;
use rattendance::core::totals::Totals;
use rattendance::db::initialize::init_db;
use rattendance::db::pool::DbPool;
use rusqlite::params;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const STUDENT: &str = "alice";

pub fn rat() -> Command {
    cargo_bin_cmd!("rattendance")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rattendance_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB through the CLI and seed a small catalog.
pub fn init_db_with_catalog(db_path: &str) {
    rat()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    for (code, name, total) in [
        ("CN", "Computer Networks", "10"),
        ("OS", "Operating Systems", "12"),
        ("DB", "Databases", "0"),
    ] {
        rat()
            .args(["--db", db_path, "catalog", "add", code, name, "--total", total])
            .assert()
            .success();
    }
}

/// A migrated database file in its own temp dir (dropped with the TempDir).
pub struct TestDb {
    pub dir: TempDir,
    pub path: String,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir
            .path()
            .join("attendance.sqlite")
            .to_string_lossy()
            .to_string();

        let pool = DbPool::new(&path).expect("open db");
        init_db(&pool.conn).expect("init db");
        seed_catalog(&pool);

        Self { dir, path }
    }

    pub fn open(&self) -> DbPool {
        DbPool::new(&self.path).expect("open db")
    }
}

pub fn seed_catalog(pool: &DbPool) {
    for (code, name, total) in [
        ("CN", "Computer Networks", 10),
        ("OS", "Operating Systems", 12),
        ("DB", "Databases", 0),
    ] {
        pool.conn
            .execute(
                "INSERT INTO catalog (code, name, default_total) VALUES (?1, ?2, ?3)",
                params![code, name, total],
            )
            .expect("seed catalog");
    }
}

/// Configure `subject` for `student` with `total`.
pub fn configure(pool: &mut DbPool, student: &str, subject: &str, total: i64) {
    Totals::add_subject(pool, &ChangeHub::new(), student, subject, Some(total))
        .expect("add subject");
}

/// Number of ledger rows for the pair, counted directly.
pub fn ledger_rows(pool: &DbPool, student: &str, subject: &str) -> i64 {
    pool.conn
        .query_row(
            "SELECT COUNT(*) FROM attendance_logs WHERE student_id = ?1 AND subject = ?2",
            params![student, subject],
            |row| row.get(0),
        )
        .expect("count logs")
}

/// Cached counter for the pair.
pub fn cached_count(pool: &DbPool, student: &str, subject: &str) -> i64 {
    pool.conn
        .query_row(
            "SELECT count FROM subject_totals WHERE student_id = ?1 AND subject = ?2",
            params![student, subject],
            |row| row.get(0),
        )
        .expect("read count")
}
