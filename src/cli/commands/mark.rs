use crate::cli::commands::{audit, open_pool};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::changes::ChangeHub;
use crate::core::ledger::Ledger;
use crate::db::store::AttendanceStore;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::formatting::{count_label, percent_label};

/// Mark attendance for one lecture.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Mark { subject, note } = cmd {
        let mut pool = open_pool(cfg)?;
        let hub = ChangeHub::new();

        let log = Ledger::record_attendance(&mut pool, &hub, &cfg.student, subject, note.as_deref())?;

        audit(
            &pool,
            "mark",
            &log.subject,
            &format!("Record #{} for {}", log.id, cfg.student),
        );

        let status = match pool.find_total(&cfg.student, &log.subject)? {
            Some(t) => format!(
                " Now {} ({}).",
                count_label(&t),
                percent_label(t.project().percent)
            ),
            None => String::new(),
        };
        success(format!(
            "Marked {} on {} (record #{}).{}",
            log.subject,
            log.date_str(),
            log.id,
            status
        ));
    }

    Ok(())
}
