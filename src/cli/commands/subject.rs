use crate::cli::commands::{ask_confirmation, audit, open_pool};
use crate::cli::parser::{Commands, SubjectAction};
use crate::config::Config;
use crate::core::changes::ChangeHub;
use crate::core::totals::{Totals, parse_total};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Subject { action } = cmd {
        let mut pool = open_pool(cfg)?;
        let hub = ChangeHub::new();
        let student = cfg.student.as_str();

        match action {
            SubjectAction::Add { code, total } => {
                let total = total.as_deref().map(parse_total).transpose()?;
                let row = Totals::add_subject(&mut pool, &hub, student, code, total)?;

                audit(
                    &pool,
                    "subject_add",
                    &row.subject,
                    &format!("Tracking {} for {} (total {})", row.subject, student, row.total),
                );
                if row.total > 0 {
                    success(format!("Tracking {} ({} lectures).", row.subject, row.total));
                } else {
                    success(format!("Tracking {} (uncapped).", row.subject));
                }
            }

            SubjectAction::Total { code, value } => {
                Totals::set_total_str(&mut pool, &hub, student, code, value)?;

                audit(
                    &pool,
                    "total",
                    &code.to_uppercase(),
                    &format!("Total set to {} for {}", value.trim(), student),
                );
                success(format!("Total for {} set to {}.", code.to_uppercase(), value.trim()));
            }

            SubjectAction::Remove { code, yes } => {
                let prompt = format!(
                    "Stop tracking {} and delete all its attendance records? This action is irreversible.",
                    code.to_uppercase()
                );
                if !*yes && !ask_confirmation(&prompt) {
                    info("Operation cancelled.");
                    return Ok(());
                }

                let removed = Totals::remove_subject(&mut pool, &hub, student, code)?;

                audit(
                    &pool,
                    "subject_remove",
                    &code.to_uppercase(),
                    &format!("Removed with {} records for {}", removed, student),
                );
                success(format!(
                    "{} removed ({} records deleted).",
                    code.to_uppercase(),
                    removed
                ));
            }
        }
    }

    Ok(())
}
