use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::totals::Totals;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::colors::{color_for_percent, colorize};
use crate::utils::formatting::{count_label, percent_label, progress_bar};
use crate::utils::table::Table;

const BAR_WIDTH: usize = 20;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { bars } = cmd {
        let mut pool = open_pool(cfg)?;
        let totals = Totals::list_totals(&mut pool, &cfg.student)?;

        if totals.is_empty() {
            info(format!(
                "No subjects configured for {}. Use `subject add <CODE>`.",
                cfg.student
            ));
            return Ok(());
        }

        header(format!("Attendance of {}", cfg.student));

        let mut headers = vec!["Subject", "Attended", "%"];
        if *bars {
            headers.push("Progress");
        }
        let mut table = Table::new(headers);

        for t in &totals {
            let p = t.project();
            let mut attended = count_label(t);
            if t.is_full() {
                attended.push_str(" (full)");
            }
            let mut row = vec![t.subject.clone(), attended, percent_label(p.percent)];
            if *bars {
                row.push(progress_bar(p.percent, BAR_WIDTH, '.'));
            }
            table.add_row(row);
        }
        print!("{}", table.render(&cfg.separator_char));

        let (attended, scheduled) = totals
            .iter()
            .filter(|t| t.is_capped())
            .fold((0, 0), |(a, s), t| (a + t.project().capped, s + t.total));
        if scheduled > 0 {
            let overall = ((100 * attended) as f64 / scheduled as f64).round() as i64;
            println!(
                "\nOverall: {}/{} ({})",
                attended,
                scheduled,
                colorize(&percent_label(Some(overall)), color_for_percent(Some(overall)))
            );
        }
    }

    Ok(())
}
