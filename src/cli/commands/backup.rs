use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Backup {
        file,
        compress,
        force,
    } = cmd
    {
        let mut pool = open_pool(cfg)?;
        let written = BackupLogic::backup(&mut pool, &cfg.database, file, *compress, *force)?;
        success(format!("Backup created: {}", written.display()));
    }

    Ok(())
}
