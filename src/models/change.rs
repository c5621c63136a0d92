use serde::Serialize;
use std::fmt;

/// Tables whose mutations are announced to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    AttendanceLogs,
    SubjectTotals,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::AttendanceLogs => "attendance_logs",
            Table::SubjectTotals => "subject_totals",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notification that rows of `table` owned by `student_id` changed.
/// Receivers re-fetch; the payload is only a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub student_id: String,
    pub table: Table,
    pub kind: ChangeKind,
    pub key: Option<String>,
}

impl ChangeEvent {
    pub fn new(student_id: &str, table: Table, kind: ChangeKind, key: Option<String>) -> Self {
        Self {
            student_id: student_id.to_string(),
            table,
            kind,
            key,
        }
    }

    pub fn topic(&self) -> String {
        topic(&self.student_id, self.table)
    }
}

pub fn topic(student_id: &str, table: Table) -> String {
    format!("{}:{}", student_id, table)
}
