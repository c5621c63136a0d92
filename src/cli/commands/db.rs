use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::pending_count;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RED, RESET, YELLOW};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = cmd
    {
        //
        // 1) MIGRATE
        //
        let mut pool = if *migrate {
            let raw = DbPool::with_timeout(&cfg.database, cfg.busy_timeout_ms)?;
            let pending = pending_count(&raw.conn)?;
            println!("{}▶ Running migrations ({} pending)…{}", CYAN, pending, RESET);
            drop(raw);
            let pool = open_pool(cfg)?;
            println!("{}✔ Migration completed.{}\n", GREEN, RESET);
            pool
        } else {
            open_pool(cfg)?
        };

        //
        // 2) INFO
        //
        if *info {
            stats::print_db_info(&mut pool, &cfg.database)?;
        }

        //
        // 3) CHECK
        //
        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);

            let integrity: String = pool
                .conn
                .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

            if integrity == "ok" {
                println!("{}✔ Integrity check passed.{}", GREEN, RESET);
            } else {
                println!("{}✘ Integrity check failed:{} {}", RED, RESET, integrity);
            }

            let drifted = count_drift(&pool)?;
            if drifted.is_empty() {
                println!("{}✔ All counters match their records.{}\n", GREEN, RESET);
            } else {
                for (student, subject, cached, actual) in &drifted {
                    println!(
                        "{}✘ {} / {}: counter {} but {} records{}",
                        YELLOW, student, subject, cached, actual, RESET
                    );
                }
                println!("Run `rattendance recount` to repair.\n");
            }
        }

        //
        // 4) VACUUM
        //
        if *vacuum {
            println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            pool.conn.execute_batch("VACUUM;")?;
            println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
        }
    }

    Ok(())
}

/// Counters that disagree with the ledger, across all students.
fn count_drift(pool: &DbPool) -> AppResult<Vec<(String, String, i64, i64)>> {
    let mut stmt = pool.conn.prepare(
        "SELECT student_id, subject, count, actual FROM (
             SELECT t.student_id, t.subject, t.count,
                    (SELECT COUNT(*) FROM attendance_logs l
                     WHERE l.student_id = t.student_id AND l.subject = t.subject) AS actual
             FROM subject_totals t
         )
         WHERE count <> actual
         ORDER BY student_id, subject",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
