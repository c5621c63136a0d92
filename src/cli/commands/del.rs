use crate::cli::commands::{ask_confirmation, audit, open_pool};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::changes::ChangeHub;
use crate::core::ledger::Ledger;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, yes } = cmd {
        let prompt = format!("Delete attendance record #{}? This action is irreversible.", id);
        if !*yes && !ask_confirmation(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        let mut pool = open_pool(cfg)?;
        let hub = ChangeHub::new();

        let log = Ledger::delete_attendance(&mut pool, &hub, &cfg.student, *id)?;

        audit(
            &pool,
            "del",
            &log.subject,
            &format!("Record #{} of {} deleted", log.id, cfg.student),
        );
        success(format!(
            "Record #{} ({} on {}) has been deleted.",
            log.id,
            log.subject,
            log.date_str()
        ));
    }

    Ok(())
}
