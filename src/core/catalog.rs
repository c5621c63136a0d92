use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::catalog::CatalogEntry;
use rusqlite::params;
use std::fs;
use std::path::Path;

/// Maintenance of the subject catalog (reference data).
pub struct Catalog;

impl Catalog {
    pub fn add(pool: &mut DbPool, code: &str, name: &str, default_total: i64) -> AppResult<CatalogEntry> {
        let entry = validate(CatalogEntry {
            code: CatalogEntry::normalize_code(code),
            name: name.trim().to_string(),
            default_total,
        })?;

        pool.with_tx(|tx| {
            if queries::find_catalog_entry(tx, &entry.code)?.is_some() {
                return Err(AppError::AlreadyExists(format!(
                    "catalog subject '{}'",
                    entry.code
                )));
            }
            tx.execute(
                "INSERT INTO catalog (code, name, default_total) VALUES (?1, ?2, ?3)",
                params![entry.code, entry.name, entry.default_total],
            )?;
            Ok(())
        })?;

        Ok(entry)
    }

    pub fn list(pool: &mut DbPool) -> AppResult<Vec<CatalogEntry>> {
        Ok(queries::load_catalog(&pool.conn)?)
    }

    /// Load a YAML list of entries, inserting new codes and updating
    /// names/defaults of existing ones. All or nothing.
    pub fn import(pool: &mut DbPool, path: &Path) -> AppResult<usize> {
        let content = fs::read_to_string(path)?;
        let entries: Vec<CatalogEntry> = serde_yaml::from_str(&content)?;

        let entries = entries
            .into_iter()
            .map(|e| {
                validate(CatalogEntry {
                    code: CatalogEntry::normalize_code(&e.code),
                    name: e.name.trim().to_string(),
                    default_total: e.default_total,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        pool.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO catalog (code, name, default_total) VALUES (?1, ?2, ?3)
                 ON CONFLICT(code) DO UPDATE SET
                     name = excluded.name,
                     default_total = excluded.default_total",
            )?;
            for e in &entries {
                stmt.execute(params![e.code, e.name, e.default_total])?;
            }
            Ok(entries.len())
        })
    }
}

fn validate(entry: CatalogEntry) -> AppResult<CatalogEntry> {
    if entry.code.is_empty() {
        return Err(AppError::InvalidValue("subject code is empty".into()));
    }
    if entry.name.is_empty() {
        return Err(AppError::InvalidValue(format!(
            "subject '{}' has no name",
            entry.code
        )));
    }
    if entry.default_total < 0 {
        return Err(AppError::InvalidValue(format!(
            "default total for '{}' must be zero or positive",
            entry.code
        )));
    }
    Ok(entry)
}
