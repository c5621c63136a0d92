use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use ansi_term::Colour;
use regex::Regex;
use std::sync::LazyLock;

const OP_WIDTH_LIMIT: usize = 60;

static ANSI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;]*[mK]").expect("static regex"));

fn strip_ansi(s: &str) -> String {
    ANSI.replace_all(s, "").into_owned()
}

/// Colour of an operation in the audit log.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "mark" => Colour::Green,
        "del" => Colour::Red,
        "total" => Colour::Yellow,
        "subject_add" | "onboard" => Colour::Cyan,
        "subject_remove" => Colour::Red,
        "recount" => Colour::Yellow,
        "catalog" => Colour::Blue,
        "migration_applied" => Colour::Purple,
        "backup" | "export" => Colour::Blue,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// Render one audit row without trailing newline.
pub fn format_row(row: &LogRow, id_w: usize, date_w: usize, op_w: usize) -> String {
    let color = color_for_operation(&row.operation);

    let mut visible = if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    };
    if visible.chars().count() > OP_WIDTH_LIMIT {
        visible = visible.chars().take(OP_WIDTH_LIMIT - 3).collect::<String>() + "...";
    }

    // only the operation word is coloured
    let colored = match visible.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(visible.as_str()).to_string(),
    };
    let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&colored).chars().count()));

    let date = chrono::DateTime::parse_from_rfc3339(&row.date)
        .map(|dt| dt.format("%FT%T%:z").to_string())
        .unwrap_or_else(|_| row.date.clone());

    format!(
        "{:>id_w$}: {:<date_w$} | {}{} => {}",
        row.id,
        date,
        colored,
        padding,
        row.message,
        id_w = id_w,
        date_w = date_w
    )
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &mut DbPool) -> AppResult<()> {
        let entries = load_log(&pool.conn)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let op_w = entries
            .iter()
            .map(|r| r.operation.len() + r.target.len() + 3)
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_LIMIT);
        let id_w = entries
            .iter()
            .map(|r| r.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|r| r.date.len()).max().unwrap_or(10);

        println!("📜 Internal log:\n");
        for row in &entries {
            println!("{}", format_row(row, id_w, date_w, op_w));
        }

        Ok(())
    }
}
