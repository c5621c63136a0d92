use serde::Serialize;

/// Cached attendance counter for one (student, subject) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTotal {
    pub student_id: String,
    pub subject: String,
    pub count: i64,
    /// Target lecture count; `0` means uncapped.
    pub total: i64,
}

/// Read-only figures shown to the user for a [`SubjectTotal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalProjection {
    pub capped: i64,
    pub percent: Option<i64>,
}

impl SubjectTotal {
    pub fn is_capped(&self) -> bool {
        self.total > 0
    }

    pub fn is_full(&self) -> bool {
        self.is_capped() && self.count >= self.total
    }

    pub fn project(&self) -> TotalProjection {
        if self.total > 0 {
            let capped = self.count.min(self.total);
            let percent = (100.0 * capped as f64 / self.total as f64).round() as i64;
            TotalProjection {
                capped,
                percent: Some(percent),
            }
        } else {
            TotalProjection {
                capped: self.count,
                percent: None,
            }
        }
    }
}
