use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Decide whether `path` may be (over)written.
///
/// A missing file, or `force`, is always fine. Otherwise the user is asked
/// on stdin; anything but `y`/`yes` aborts with an I/O error.
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if force || !path.exists() {
        return Ok(());
    }

    warning(format!("'{}' already exists.", path.display()));
    print!("Overwrite? [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(()),
        _ => Err(AppError::from(io::Error::other(format!(
            "refusing to overwrite {}",
            path.display()
        )))),
    }
}
