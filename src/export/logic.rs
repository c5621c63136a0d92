use crate::db::pool::DbPool;
use crate::db::store::AttendanceStore;
use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use crate::export::writers::{write_csv, write_json};
use crate::export::{ExportFormat, RecordExport};
use std::path::Path;

/// High-level export of a student's attendance ledger.
pub struct ExportLogic;

impl ExportLogic {
    /// Write the ledger (oldest first) and return the number of rows.
    pub fn export(
        pool: &mut DbPool,
        student: &str,
        subject: Option<&str>,
        format: ExportFormat,
        file: &str,
        force: bool,
    ) -> AppResult<usize> {
        let path = Path::new(file);
        ensure_writable(path, force)?;

        let mut logs = pool.query_logs(student, subject)?;
        logs.reverse();

        let rows: Vec<RecordExport> = logs
            .into_iter()
            .map(|l| RecordExport {
                id: l.id,
                subject: l.subject,
                date: l.date.to_rfc3339(),
                note: l.note.unwrap_or_default(),
            })
            .collect();

        match format {
            ExportFormat::Csv => write_csv(path, &rows)?,
            ExportFormat::Json => write_json(path, &rows)?,
        }

        Ok(rows.len())
    }
}
