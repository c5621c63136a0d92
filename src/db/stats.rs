use crate::db::pool::DbPool;
use crate::db::queries::parse_timestamp;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    //
    // 2) ROW COUNTS
    //
    let subjects: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM catalog", [], |row| row.get(0))?;
    let students: i64 = pool.conn.query_row(
        "SELECT COUNT(DISTINCT student_id) FROM subject_totals",
        [],
        |row| row.get(0),
    )?;
    let records: i64 = pool
        .conn
        .query_row("SELECT COUNT(*) FROM attendance_logs", [], |row| row.get(0))?;

    println!("{}• Catalog subjects:{} {}{}{}", CYAN, RESET, GREEN, subjects, RESET);
    println!("{}• Students:{} {}{}{}", CYAN, RESET, GREEN, students, RESET);
    println!("{}• Attendance records:{} {}{}{}", CYAN, RESET, GREEN, records, RESET);

    //
    // 3) DATE RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT date FROM attendance_logs ORDER BY date ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT date FROM attendance_logs ORDER BY date DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let local = |raw: Option<String>| -> rusqlite::Result<String> {
        match raw {
            Some(raw) => Ok(parse_timestamp(&raw)?
                .format("%Y-%m-%d %H:%M:%S %:z")
                .to_string()),
            None => Ok(format!("{GREY}--{RESET}")),
        }
    };

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", local(first)?);
    println!("    to:   {}", local(last)?);

    println!();
    Ok(())
}
