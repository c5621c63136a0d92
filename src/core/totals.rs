use crate::core::changes::ChangeHub;
use crate::db::store::AttendanceStore;
use crate::errors::{AppError, AppResult};
use crate::models::catalog::CatalogEntry;
use crate::models::change::{ChangeEvent, ChangeKind, Table};
use crate::models::subject_total::SubjectTotal;

/// Per-subject totals management.
pub struct Totals;

impl Totals {
    /// Overwrite the target total. `count` is left as is, even when it ends
    /// up above the new total.
    pub fn set_total<S: AttendanceStore>(
        store: &mut S,
        hub: &ChangeHub,
        student: &str,
        subject: &str,
        new_total: i64,
    ) -> AppResult<()> {
        let subject = CatalogEntry::normalize_code(subject);
        let total = validate_total(new_total)?;

        store.update_total(student, &subject, total)?;

        announce(hub, student, ChangeKind::Update, &subject);
        Ok(())
    }

    /// Same as [`Totals::set_total`] for raw user input.
    pub fn set_total_str<S: AttendanceStore>(
        store: &mut S,
        hub: &ChangeHub,
        student: &str,
        subject: &str,
        raw: &str,
    ) -> AppResult<()> {
        let total = parse_total(raw)?;
        Self::set_total(store, hub, student, subject, total)
    }

    /// Configure a catalog subject for a student. Without `initial_total`
    /// the catalog's default is used.
    pub fn add_subject<S: AttendanceStore>(
        store: &mut S,
        hub: &ChangeHub,
        student: &str,
        subject: &str,
        initial_total: Option<i64>,
    ) -> AppResult<SubjectTotal> {
        let subject = CatalogEntry::normalize_code(subject);

        let entry = store
            .catalog_entry(&subject)?
            .ok_or_else(|| AppError::UnknownSubject(subject.clone()))?;

        let total = validate_total(initial_total.unwrap_or(entry.default_total))?;

        store.insert_total(student, &subject, total)?;

        announce(hub, student, ChangeKind::Insert, &subject);
        Ok(SubjectTotal {
            student_id: student.to_string(),
            subject,
            count: 0,
            total,
        })
    }

    /// Drop a subject and its attendance history. Returns how many ledger
    /// rows went with it.
    pub fn remove_subject<S: AttendanceStore>(
        store: &mut S,
        hub: &ChangeHub,
        student: &str,
        subject: &str,
    ) -> AppResult<usize> {
        let subject = CatalogEntry::normalize_code(subject);

        let removed = store.delete_total(student, &subject)?;

        announce(hub, student, ChangeKind::Delete, &subject);
        if removed > 0 {
            hub.publish(ChangeEvent::new(
                student,
                Table::AttendanceLogs,
                ChangeKind::Delete,
                None,
            ));
        }
        Ok(removed)
    }

    pub fn list_totals<S: AttendanceStore>(
        store: &mut S,
        student: &str,
    ) -> AppResult<Vec<SubjectTotal>> {
        store.query_totals(student)
    }
}

fn announce(hub: &ChangeHub, student: &str, kind: ChangeKind, subject: &str) {
    hub.publish(ChangeEvent::new(
        student,
        Table::SubjectTotals,
        kind,
        Some(subject.to_string()),
    ));
}

fn validate_total(total: i64) -> AppResult<i64> {
    if total < 0 {
        return Err(AppError::InvalidValue(format!(
            "total must be zero or positive, got {}",
            total
        )));
    }
    Ok(total)
}

/// Parse a total typed by the user: a whole, non-negative number.
pub fn parse_total(raw: &str) -> AppResult<i64> {
    let trimmed = raw.trim();
    let total: i64 = trimmed
        .parse()
        .map_err(|_| AppError::InvalidValue(format!("'{}' is not a whole number", trimmed)))?;
    validate_total(total)
}
