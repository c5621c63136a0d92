use crate::cli::commands::{audit, open_pool};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        subject,
        force,
    } = cmd
    {
        let mut pool = open_pool(cfg)?;
        let subject = subject.as_deref().map(crate::models::catalog::CatalogEntry::normalize_code);

        let n = ExportLogic::export(
            &mut pool,
            &cfg.student,
            subject.as_deref(),
            *format,
            file,
            *force,
        )?;

        audit(
            &pool,
            "export",
            file,
            &format!("{} records exported as {}", n, format.as_str()),
        );
        success(format!("{} export completed: {} ({} records)", format.as_str(), file, n));
    }
    Ok(())
}
