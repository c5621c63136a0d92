use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Local};
use serde::Serialize;

/// Maximum length of a note, in characters.
pub const MAX_NOTE_CHARS: usize = 280;

/// One attendance event in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceLog {
    pub id: i64,
    pub student_id: String, // ⇔ attendance_logs.student_id
    pub subject: String,    // ⇔ attendance_logs.subject (FK subject_totals)
    pub date: DateTime<Local>,
    pub note: Option<String>,
}

impl AttendanceLog {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// A note is accepted when it fits in `MAX_NOTE_CHARS` characters.
/// Blank notes are stored as `None`.
pub fn normalize_note(note: Option<&str>) -> AppResult<Option<String>> {
    match note.map(str::trim) {
        None | Some("") => Ok(None),
        Some(n) if n.chars().count() <= MAX_NOTE_CHARS => Ok(Some(n.to_string())),
        Some(n) => Err(AppError::InvalidValue(format!(
            "note is {} characters long, the limit is {}",
            n.chars().count(),
            MAX_NOTE_CHARS
        ))),
    }
}
