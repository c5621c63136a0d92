pub(crate) mod fs_utils;
pub mod logic;
mod writers;

pub use logic::ExportLogic;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Flat row written to export files.
#[derive(Debug, Clone, Serialize)]
pub struct RecordExport {
    pub id: i64,
    pub subject: String,
    pub date: String,
    pub note: String,
}
