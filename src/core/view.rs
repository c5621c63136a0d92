use crate::core::changes::{ChangeHub, Subscription};
use crate::db::store::AttendanceStore;
use crate::errors::AppResult;
use crate::models::change::Table;
use crate::models::subject_total::SubjectTotal;

/// A live view of a student's totals, as a dashboard would hold it.
///
/// The snapshot is authoritative only right after a fetch. Optimistic
/// patches are provisional and get replaced by the next re-fetch.
pub struct TotalsView {
    student: String,
    rows: Vec<SubjectTotal>,
    dirty: bool,
    subscription: Subscription,
}

impl TotalsView {
    /// Subscribe first, then fetch, so no change between the two is missed.
    pub fn open<S: AttendanceStore>(store: &mut S, hub: &ChangeHub, student: &str) -> AppResult<Self> {
        let subscription = hub.subscribe(student, Table::SubjectTotals);
        let rows = store.query_totals(student)?;
        Ok(Self {
            student: student.to_string(),
            rows,
            dirty: false,
            subscription,
        })
    }

    pub fn rows(&self) -> &[SubjectTotal] {
        &self.rows
    }

    pub fn get(&self, subject: &str) -> Option<&SubjectTotal> {
        self.rows.iter().find(|r| r.subject == subject)
    }

    /// True while the snapshot carries a local patch not yet confirmed by a fetch.
    pub fn is_provisional(&self) -> bool {
        self.dirty
    }

    /// Patch a row locally, e.g. bump `count` right after the user clicks.
    pub fn apply_optimistic<F>(&mut self, subject: &str, patch: F)
    where
        F: FnOnce(&mut SubjectTotal),
    {
        if let Some(row) = self.rows.iter_mut().find(|r| r.subject == subject) {
            patch(row);
            self.dirty = true;
        }
    }

    /// Re-fetch if any change notification arrived since the last sync.
    /// Returns true when the snapshot was replaced.
    pub fn sync<S: AttendanceStore>(&mut self, store: &mut S) -> AppResult<bool> {
        if !self.subscription.drain() {
            return Ok(false);
        }
        self.refresh(store)?;
        Ok(true)
    }

    /// Unconditional re-fetch.
    pub fn refresh<S: AttendanceStore>(&mut self, store: &mut S) -> AppResult<()> {
        self.rows = store.query_totals(&self.student)?;
        self.dirty = false;
        Ok(())
    }
}
