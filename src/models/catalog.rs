use serde::{Deserialize, Serialize};

/// Reference data: a subject students can enrol in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub default_total: i64,
}

impl CatalogEntry {
    /// Subject codes are stored upper-case and trimmed.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }
}
