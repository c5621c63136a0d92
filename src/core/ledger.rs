use crate::core::changes::ChangeHub;
use crate::db::store::{AttendanceStore, Repair};
use crate::errors::AppResult;
use crate::models::attendance_log::{AttendanceLog, normalize_note};
use crate::models::catalog::CatalogEntry;
use crate::models::change::{ChangeEvent, ChangeKind, Table};
use chrono::Local;

/// Attendance marking and removal.
///
/// Ledger row and counter always change together; see
/// [`AttendanceStore::insert_log_and_increment`].
pub struct Ledger;

impl Ledger {
    pub fn record_attendance<S: AttendanceStore>(
        store: &mut S,
        hub: &ChangeHub,
        student: &str,
        subject: &str,
        note: Option<&str>,
    ) -> AppResult<AttendanceLog> {
        let subject = CatalogEntry::normalize_code(subject);
        let note = normalize_note(note)?;

        let log = store.insert_log_and_increment(student, &subject, note.as_deref(), Local::now())?;

        announce_ledger_change(hub, student, ChangeKind::Insert, log.id);
        Ok(log)
    }

    pub fn delete_attendance<S: AttendanceStore>(
        store: &mut S,
        hub: &ChangeHub,
        student: &str,
        log_id: i64,
    ) -> AppResult<AttendanceLog> {
        let log = store.delete_log_and_decrement(student, log_id)?;

        announce_ledger_change(hub, student, ChangeKind::Delete, log.id);
        Ok(log)
    }

    pub fn history<S: AttendanceStore>(
        store: &mut S,
        student: &str,
        subject: Option<&str>,
    ) -> AppResult<Vec<AttendanceLog>> {
        let subject = subject.map(CatalogEntry::normalize_code);
        store.query_logs(student, subject.as_deref())
    }

    /// Rewrite counters that drifted from the ledger. Only announces a change
    /// when something was actually repaired.
    pub fn recount<S: AttendanceStore>(
        store: &mut S,
        hub: &ChangeHub,
        student: &str,
    ) -> AppResult<Vec<Repair>> {
        let repairs = store.recount(student)?;

        if !repairs.is_empty() {
            hub.publish(ChangeEvent::new(
                student,
                Table::SubjectTotals,
                ChangeKind::Update,
                None,
            ));
        }
        Ok(repairs)
    }
}

fn announce_ledger_change(hub: &ChangeHub, student: &str, kind: ChangeKind, log_id: i64) {
    hub.publish(ChangeEvent::new(
        student,
        Table::AttendanceLogs,
        kind,
        Some(log_id.to_string()),
    ));
    hub.publish(ChangeEvent::new(
        student,
        Table::SubjectTotals,
        ChangeKind::Update,
        None,
    ));
}
