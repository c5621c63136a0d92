use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, Result};

/// A schema step, applied once and recorded in the `log` table.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250901_0001_create_catalog",
        description: "Created catalog table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS catalog (
            code          TEXT PRIMARY KEY,
            name          TEXT NOT NULL,
            default_total INTEGER NOT NULL DEFAULT 0 CHECK(default_total >= 0)
        );
        "#,
    },
    Migration {
        version: "20250901_0002_create_subject_totals",
        description: "Created subject_totals table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS subject_totals (
            student_id  TEXT NOT NULL,
            subject     TEXT NOT NULL REFERENCES catalog(code),
            count       INTEGER NOT NULL DEFAULT 0 CHECK(count >= 0),
            total       INTEGER NOT NULL DEFAULT 0 CHECK(total >= 0),
            PRIMARY KEY (student_id, subject)
        );
        "#,
    },
    Migration {
        version: "20250901_0003_create_attendance_logs",
        description: "Created attendance_logs table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS attendance_logs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id  TEXT NOT NULL,
            subject     TEXT NOT NULL,
            date        TEXT NOT NULL,
            note        TEXT CHECK(note IS NULL OR length(note) <= 280),
            FOREIGN KEY (student_id, subject)
                REFERENCES subject_totals(student_id, subject) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_logs_student_subject
            ON attendance_logs(student_id, subject);
        CREATE INDEX IF NOT EXISTS idx_logs_student_date
            ON attendance_logs(student_id, date);
        "#,
    },
    Migration {
        version: "20251006_0004_create_pending_onboarding",
        description: "Created pending_onboarding table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS pending_onboarding (
            token_id     TEXT PRIMARY KEY,
            student_id   TEXT NOT NULL,
            subjects     TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            consumed_at  TEXT
        );
        "#,
    },
    Migration {
        version: "20251020_0005_utc_timestamps",
        description: "Rewrote stored timestamps as UTC",
        sql: r#"
        UPDATE attendance_logs
           SET date = COALESCE(strftime('%Y-%m-%dT%H:%M:%f', date) || '000Z', date)
         WHERE date NOT LIKE '%Z';
        UPDATE pending_onboarding
           SET created_at = COALESCE(strftime('%Y-%m-%dT%H:%M:%f', created_at) || '000Z', created_at)
         WHERE created_at NOT LIKE '%Z';
        UPDATE pending_onboarding
           SET consumed_at = COALESCE(strftime('%Y-%m-%dT%H:%M:%f', consumed_at) || '000Z', consumed_at)
         WHERE consumed_at IS NOT NULL AND consumed_at NOT LIKE '%Z';
        "#,
    },
];

/// Ensure that the `log` table exists; it also tracks applied migrations.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let batch = format!(
        "BEGIN;\n{}\nINSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', '{}', '{}');\nCOMMIT;",
        m.sql, m.version, m.description
    );

    if let Err(e) = conn.execute_batch(&batch) {
        // Leave the connection usable if the batch stopped mid-transaction.
        let _ = conn.execute_batch("ROLLBACK;");
        return Err(AppError::Migration(format!("{}: {}", m.version, e)));
    }
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Returns the versions applied by this call (empty when up to date).
pub fn run_pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        applied.push(m.version);
    }

    Ok(applied)
}

/// Number of known migrations that are not yet recorded as applied.
pub fn pending_count(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;
    let mut n = 0;
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            n += 1;
        }
    }
    Ok(n)
}
