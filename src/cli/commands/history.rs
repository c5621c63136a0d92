use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::formatting::truncate;
use crate::utils::table::Table;

const NOTE_WIDTH: usize = 50;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::History { subject, limit } = cmd {
        let mut pool = open_pool(cfg)?;
        let logs = Ledger::history(&mut pool, &cfg.student, subject.as_deref())?;

        if logs.is_empty() {
            info("No attendance records found.");
            return Ok(());
        }

        let mut table = Table::new(["Id", "Subject", "Date", "Note"]);
        for log in logs.iter().take(limit.unwrap_or(usize::MAX)) {
            table.add_row(vec![
                log.id.to_string(),
                log.subject.clone(),
                log.date_str(),
                truncate(log.note.as_deref().unwrap_or(""), NOTE_WIDTH),
            ]);
        }
        print!("{}", table.render(&cfg.separator_char));
    }

    Ok(())
}
