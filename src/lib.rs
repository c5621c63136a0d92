//! rAttendance library root.
//!
//! The attendance core lives in [`core`] (ledger, totals, change hub) on top
//! of the storage boundary in [`db::store`]. The [`cli`] module is the view
//! layer: it parses commands, calls the core and renders the results.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use crate::cli::commands;

    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Catalog { .. } => commands::catalog::handle(&cli.command, cfg),
        Commands::Subject { .. } => commands::subject::handle(&cli.command, cfg),
        Commands::Mark { .. } => commands::mark::handle(&cli.command, cfg),
        Commands::Del { .. } => commands::del::handle(&cli.command, cfg),
        Commands::List { .. } => commands::list::handle(&cli.command, cfg),
        Commands::History { .. } => commands::history::handle(&cli.command, cfg),
        Commands::Recount => commands::recount::handle(&cli.command, cfg),
        Commands::Onboard { .. } => commands::onboard::handle(&cli.command, cfg),
        Commands::Export { .. } => commands::export::handle(&cli.command, cfg),
        Commands::Backup { .. } => commands::backup::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once; command-line overrides win
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    if let Some(student) = &cli.student {
        cfg.student = student.trim().to_string();
    }

    dispatch(&cli, &cfg)
}
