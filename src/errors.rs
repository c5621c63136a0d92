//! Unified application error type.
//! Every layer (db, core, cli) returns AppError so the CLI can report a
//! single typed failure to the user.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Attendance / totals
    // ---------------------------
    #[error("Subject '{0}' is not configured for this student")]
    NotConfigured(String),

    #[error("Attendance cap reached for '{subject}' ({count}/{total})")]
    CapacityReached {
        subject: String,
        count: i64,
        total: i64,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // ---------------------------
    // Storage
    // ---------------------------
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Onboarding
    // ---------------------------
    #[error("Invalid onboarding token: {0}")]
    InvalidToken(String),

    // ---------------------------
    // IO / config / export
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(String),
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
