use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::fs_utils::ensure_writable;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Copy the database to `dest_file` (optionally zipped) and return the
    /// path actually written.
    pub fn backup(
        pool: &mut DbPool,
        db_path: &str,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<PathBuf> {
        let src = Path::new(db_path);
        let dest = Path::new(dest_file);

        if !src.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )
            .into());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let final_path = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };
        ensure_writable(&final_path, force)?;

        if compress {
            compress_into(src, &final_path)?;
        } else {
            fs::copy(src, &final_path)?;
        }

        audit(
            &pool.conn,
            "backup",
            &final_path.to_string_lossy(),
            if compress {
                "Backup created and compressed"
            } else {
                "Backup created"
            },
        )?;

        Ok(final_path)
    }
}

/// Write `src` as the single entry of a deflated zip at `zip_path`.
fn compress_into(src: &Path, zip_path: &Path) -> AppResult<()> {
    let file = fs::File::create(zip_path)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "rattendance.sqlite".to_string());

    let mut f = fs::File::open(src)?;
    zip.start_file(name, options).map_err(std::io::Error::other)?;
    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(())
}
