pub mod backup;
pub mod catalog;
pub mod config;
pub mod db;
pub mod del;
pub mod export;
pub mod history;
pub mod init;
pub mod list;
pub mod log;
pub mod mark;
pub mod onboard;
pub mod recount;
pub mod subject;

use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{error, warning};
use std::io::{self, Write};

/// Open the configured database and bring its schema up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::with_timeout(&cfg.database, cfg.busy_timeout_ms)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// Record an operation in the audit log; failures are reported, not fatal.
pub(crate) fn audit(pool: &DbPool, operation: &str, target: &str, message: &str) {
    if let Err(e) = crate::db::log::audit(&pool.conn, operation, target, message) {
        error(format!("Failed to write internal log: {}", e));
    }
}

/// Ask a yes/no confirmation from the user
pub(crate) fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}
