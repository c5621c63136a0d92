use super::RecordExport;
use crate::errors::AppResult;
use csv::Writer;
use std::path::Path;

pub fn write_csv(path: &Path, rows: &[RecordExport]) -> AppResult<()> {
    let mut wtr = Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json(path: &Path, rows: &[RecordExport]) -> AppResult<()> {
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, json)?;
    Ok(())
}
