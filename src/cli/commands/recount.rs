use crate::cli::commands::{audit, open_pool};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::changes::ChangeHub;
use crate::core::ledger::Ledger;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Recount = cmd {
        let mut pool = open_pool(cfg)?;
        let hub = ChangeHub::new();

        let repairs = Ledger::recount(&mut pool, &hub, &cfg.student)?;

        if repairs.is_empty() {
            success("All counters match the attendance records.");
            return Ok(());
        }

        for r in &repairs {
            warning(format!("{}: counter {} → {}", r.subject, r.cached, r.actual));
            audit(
                &pool,
                "recount",
                &r.subject,
                &format!("Counter of {} fixed {} → {}", cfg.student, r.cached, r.actual),
            );
        }
        success(format!("Repaired {} counter(s).", repairs.len()));
    }

    Ok(())
}
