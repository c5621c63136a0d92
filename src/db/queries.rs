//! Row mappers and plain read queries shared by the store implementation.

use crate::errors::AppError;
use crate::models::attendance_log::AttendanceLog;
use crate::models::catalog::CatalogEntry;
use crate::models::subject_total::SubjectTotal;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

/// Stored form of a timestamp: UTC with fixed microsecond precision, so the
/// text sorts in time order regardless of the local offset at write time.
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(AppError::InvalidValue(format!("bad timestamp: {}", raw))),
            )
        })
}

pub fn map_log(row: &Row) -> Result<AttendanceLog> {
    let raw_date: String = row.get("date")?;

    Ok(AttendanceLog {
        id: row.get("id")?,
        student_id: row.get("student_id")?,
        subject: row.get("subject")?,
        date: parse_timestamp(&raw_date)?,
        note: row.get("note")?,
    })
}

pub fn map_total(row: &Row) -> Result<SubjectTotal> {
    Ok(SubjectTotal {
        student_id: row.get("student_id")?,
        subject: row.get("subject")?,
        count: row.get("count")?,
        total: row.get("total")?,
    })
}

pub fn map_catalog(row: &Row) -> Result<CatalogEntry> {
    Ok(CatalogEntry {
        code: row.get("code")?,
        name: row.get("name")?,
        default_total: row.get("default_total")?,
    })
}

pub fn find_total(conn: &Connection, student: &str, subject: &str) -> Result<Option<SubjectTotal>> {
    conn.query_row(
        "SELECT student_id, subject, count, total FROM subject_totals
         WHERE student_id = ?1 AND subject = ?2",
        params![student, subject],
        map_total,
    )
    .optional()
}

pub fn find_log(conn: &Connection, student: &str, id: i64) -> Result<Option<AttendanceLog>> {
    conn.query_row(
        "SELECT id, student_id, subject, date, note FROM attendance_logs
         WHERE id = ?1 AND student_id = ?2",
        params![id, student],
        map_log,
    )
    .optional()
}

pub fn find_catalog_entry(conn: &Connection, code: &str) -> Result<Option<CatalogEntry>> {
    conn.query_row(
        "SELECT code, name, default_total FROM catalog WHERE code = ?1",
        [code],
        map_catalog,
    )
    .optional()
}

pub fn load_totals(conn: &Connection, student: &str) -> Result<Vec<SubjectTotal>> {
    let mut stmt = conn.prepare_cached(
        "SELECT student_id, subject, count, total FROM subject_totals
         WHERE student_id = ?1
         ORDER BY subject ASC",
    )?;

    let rows = stmt.query_map([student], map_total)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Ledger rows for a student, newest first.
pub fn load_logs(
    conn: &Connection,
    student: &str,
    subject: Option<&str>,
) -> Result<Vec<AttendanceLog>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, student_id, subject, date, note FROM attendance_logs
         WHERE student_id = ?1 AND (?2 IS NULL OR subject = ?2)
         ORDER BY date DESC, id DESC",
    )?;

    let rows = stmt.query_map(params![student, subject], map_log)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_catalog(conn: &Connection) -> Result<Vec<CatalogEntry>> {
    let mut stmt =
        conn.prepare_cached("SELECT code, name, default_total FROM catalog ORDER BY code ASC")?;

    let rows = stmt.query_map([], map_catalog)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Number of ledger rows per subject for a student, the ground truth for `count`.
pub fn ledger_counts(conn: &Connection, student: &str) -> Result<Vec<(String, i64, i64)>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.subject, t.count,
                (SELECT COUNT(*) FROM attendance_logs l
                 WHERE l.student_id = t.student_id AND l.subject = t.subject)
         FROM subject_totals t
         WHERE t.student_id = ?1
         ORDER BY t.subject ASC",
    )?;

    let rows = stmt.query_map([student], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
