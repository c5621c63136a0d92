//! Storage boundary for attendance data.
//!
//! Every mutation that touches both the ledger and a counter is a single
//! call here, executed as one transaction. Counters only ever move through
//! relative SQL updates (`count = count + 1`), never through a value read
//! and written back by the caller.

use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::attendance_log::AttendanceLog;
use crate::models::catalog::CatalogEntry;
use crate::models::subject_total::SubjectTotal;
use chrono::{DateTime, Local};
use rusqlite::{Connection, params};

/// Relative counter movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Up,
    Down,
}

/// A counter that disagreed with the ledger and was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    pub subject: String,
    pub cached: i64,
    pub actual: i64,
}

pub trait AttendanceStore {
    fn catalog_entry(&mut self, code: &str) -> AppResult<Option<CatalogEntry>>;

    fn find_total(&mut self, student: &str, subject: &str) -> AppResult<Option<SubjectTotal>>;

    /// Totals for a student ordered by subject code.
    fn query_totals(&mut self, student: &str) -> AppResult<Vec<SubjectTotal>>;

    /// Ledger rows for a student, newest first, optionally for one subject.
    fn query_logs(&mut self, student: &str, subject: Option<&str>)
    -> AppResult<Vec<AttendanceLog>>;

    /// Create a `count = 0` row. Fails with `UnknownSubject` or `AlreadyExists`.
    fn insert_total(&mut self, student: &str, subject: &str, total: i64) -> AppResult<()>;

    /// Overwrite `total`. Fails with `NotConfigured` when the row is missing.
    fn update_total(&mut self, student: &str, subject: &str, total: i64) -> AppResult<()>;

    /// Remove a totals row together with its ledger rows; returns the number
    /// of ledger rows removed.
    fn delete_total(&mut self, student: &str, subject: &str) -> AppResult<usize>;

    /// Move `count` by one; `Up` respects the cap, `Down` stops at zero.
    fn increment_total(&mut self, student: &str, subject: &str, delta: Delta) -> AppResult<()>;

    /// Append a ledger row and bump the counter, both or neither.
    fn insert_log_and_increment(
        &mut self,
        student: &str,
        subject: &str,
        note: Option<&str>,
        at: DateTime<Local>,
    ) -> AppResult<AttendanceLog>;

    /// Remove a ledger row owned by `student` and lower the counter, both or neither.
    fn delete_log_and_decrement(&mut self, student: &str, log_id: i64) -> AppResult<AttendanceLog>;

    /// Re-derive every counter of `student` from the ledger.
    fn recount(&mut self, student: &str) -> AppResult<Vec<Repair>>;
}

/// Apply `delta` to a counter inside the caller's transaction.
fn bump_count(conn: &Connection, student: &str, subject: &str, delta: Delta) -> AppResult<()> {
    let changed = match delta {
        Delta::Up => conn.execute(
            "UPDATE subject_totals
             SET count = count + 1
             WHERE student_id = ?1 AND subject = ?2
               AND (total = 0 OR count < total)",
            params![student, subject],
        )?,
        Delta::Down => conn.execute(
            "UPDATE subject_totals
             SET count = MAX(count - 1, 0)
             WHERE student_id = ?1 AND subject = ?2",
            params![student, subject],
        )?,
    };

    if changed == 1 {
        return Ok(());
    }

    // Nothing matched: either the row is missing or the cap held.
    match queries::find_total(conn, student, subject)? {
        None => Err(AppError::NotConfigured(subject.to_string())),
        Some(t) => Err(AppError::CapacityReached {
            subject: t.subject,
            count: t.count,
            total: t.total,
        }),
    }
}

impl AttendanceStore for DbPool {
    fn catalog_entry(&mut self, code: &str) -> AppResult<Option<CatalogEntry>> {
        Ok(queries::find_catalog_entry(&self.conn, code)?)
    }

    fn find_total(&mut self, student: &str, subject: &str) -> AppResult<Option<SubjectTotal>> {
        Ok(queries::find_total(&self.conn, student, subject)?)
    }

    fn query_totals(&mut self, student: &str) -> AppResult<Vec<SubjectTotal>> {
        Ok(queries::load_totals(&self.conn, student)?)
    }

    fn query_logs(
        &mut self,
        student: &str,
        subject: Option<&str>,
    ) -> AppResult<Vec<AttendanceLog>> {
        Ok(queries::load_logs(&self.conn, student, subject)?)
    }

    fn insert_total(&mut self, student: &str, subject: &str, total: i64) -> AppResult<()> {
        self.with_tx(|tx| {
            if queries::find_catalog_entry(tx, subject)?.is_none() {
                return Err(AppError::UnknownSubject(subject.to_string()));
            }
            if queries::find_total(tx, student, subject)?.is_some() {
                return Err(AppError::AlreadyExists(format!(
                    "subject '{}' for student '{}'",
                    subject, student
                )));
            }

            tx.execute(
                "INSERT INTO subject_totals (student_id, subject, count, total)
                 VALUES (?1, ?2, 0, ?3)",
                params![student, subject, total],
            )?;
            Ok(())
        })
    }

    fn update_total(&mut self, student: &str, subject: &str, total: i64) -> AppResult<()> {
        let changed = self.conn.execute(
            "UPDATE subject_totals SET total = ?3
             WHERE student_id = ?1 AND subject = ?2",
            params![student, subject, total],
        )?;

        if changed == 0 {
            return Err(AppError::NotConfigured(subject.to_string()));
        }
        Ok(())
    }

    fn delete_total(&mut self, student: &str, subject: &str) -> AppResult<usize> {
        self.with_tx(|tx| {
            let logs = tx.execute(
                "DELETE FROM attendance_logs WHERE student_id = ?1 AND subject = ?2",
                params![student, subject],
            )?;
            let totals = tx.execute(
                "DELETE FROM subject_totals WHERE student_id = ?1 AND subject = ?2",
                params![student, subject],
            )?;

            if totals == 0 {
                return Err(AppError::NotConfigured(subject.to_string()));
            }
            Ok(logs)
        })
    }

    fn increment_total(&mut self, student: &str, subject: &str, delta: Delta) -> AppResult<()> {
        bump_count(&self.conn, student, subject, delta)
    }

    fn insert_log_and_increment(
        &mut self,
        student: &str,
        subject: &str,
        note: Option<&str>,
        at: DateTime<Local>,
    ) -> AppResult<AttendanceLog> {
        self.with_tx(|tx| {
            bump_count(tx, student, subject, Delta::Up)?;

            tx.execute(
                "INSERT INTO attendance_logs (student_id, subject, date, note)
                 VALUES (?1, ?2, ?3, ?4)",
                params![student, subject, queries::format_timestamp(&at), note],
            )?;

            Ok(AttendanceLog {
                id: tx.last_insert_rowid(),
                student_id: student.to_string(),
                subject: subject.to_string(),
                date: at,
                note: note.map(str::to_string),
            })
        })
    }

    fn delete_log_and_decrement(&mut self, student: &str, log_id: i64) -> AppResult<AttendanceLog> {
        self.with_tx(|tx| {
            let log = queries::find_log(tx, student, log_id)?
                .ok_or_else(|| AppError::NotFound(format!("attendance record #{}", log_id)))?;

            tx.execute("DELETE FROM attendance_logs WHERE id = ?1", [log_id])?;
            bump_count(tx, student, &log.subject, Delta::Down)?;

            Ok(log)
        })
    }

    fn recount(&mut self, student: &str) -> AppResult<Vec<Repair>> {
        self.with_tx(|tx| {
            let mut repairs = Vec::new();

            for (subject, cached, actual) in queries::ledger_counts(tx, student)? {
                if cached == actual {
                    continue;
                }
                tx.execute(
                    "UPDATE subject_totals SET count = ?3
                     WHERE student_id = ?1 AND subject = ?2",
                    params![student, subject, actual],
                )?;
                repairs.push(Repair {
                    subject,
                    cached,
                    actual,
                });
            }

            Ok(repairs)
        })
    }
}
