use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A subject selected during sign-up, applied once the account is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubject {
    pub code: String,
    pub total: Option<i64>,
}

/// Server-side onboarding record. Clients only hold a signed reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOnboarding {
    pub token_id: String,
    pub student_id: String,
    pub subjects: Vec<PendingSubject>,
    pub created_at: DateTime<Local>,
    pub consumed_at: Option<DateTime<Local>>,
}
