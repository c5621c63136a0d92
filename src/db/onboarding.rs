use crate::db::queries::{format_timestamp, parse_timestamp};
use crate::errors::AppResult;
use crate::models::onboarding::{PendingOnboarding, PendingSubject};
use chrono::{DateTime, Local};
use rusqlite::{Connection, OptionalExtension, params};

pub fn insert_pending(conn: &Connection, pending: &PendingOnboarding) -> AppResult<()> {
    let subjects = serde_json::to_string(&pending.subjects)?;

    conn.execute(
        "INSERT INTO pending_onboarding (token_id, student_id, subjects, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            pending.token_id,
            pending.student_id,
            subjects,
            format_timestamp(&pending.created_at)
        ],
    )?;
    Ok(())
}

pub fn find_pending(conn: &Connection, token_id: &str) -> AppResult<Option<PendingOnboarding>> {
    let row = conn
        .query_row(
            "SELECT token_id, student_id, subjects, created_at, consumed_at
             FROM pending_onboarding WHERE token_id = ?1",
            [token_id],
            |row| {
                let created: String = row.get(3)?;
                let consumed: Option<String> = row.get(4)?;
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    parse_timestamp(&created)?,
                    consumed.as_deref().map(parse_timestamp).transpose()?,
                ))
            },
        )
        .optional()?;

    let Some((token_id, student_id, subjects, created_at, consumed_at)) = row else {
        return Ok(None);
    };

    let subjects: Vec<PendingSubject> = serde_json::from_str(&subjects)?;

    Ok(Some(PendingOnboarding {
        token_id,
        student_id,
        subjects,
        created_at,
        consumed_at,
    }))
}

/// Mark a record consumed. Returns false when it was already consumed.
pub fn mark_consumed(conn: &Connection, token_id: &str, at: DateTime<Local>) -> AppResult<bool> {
    let changed = conn.execute(
        "UPDATE pending_onboarding SET consumed_at = ?2
         WHERE token_id = ?1 AND consumed_at IS NULL",
        params![token_id, format_timestamp(&at)],
    )?;
    Ok(changed == 1)
}

/// Drop consumed selections and those created before `cutoff`.
pub fn prune_pending(conn: &Connection, cutoff: DateTime<Local>) -> AppResult<usize> {
    let removed = conn.execute(
        "DELETE FROM pending_onboarding
         WHERE consumed_at IS NOT NULL OR created_at < ?1",
        [format_timestamp(&cutoff)],
    )?;
    Ok(removed)
}
