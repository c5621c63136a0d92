use crate::cli::commands::{audit, open_pool};
use crate::cli::parser::{CatalogAction, Commands};
use crate::config::Config;
use crate::core::catalog::Catalog;
use crate::core::totals::parse_total;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Catalog { action } = cmd {
        let mut pool = open_pool(cfg)?;

        match action {
            CatalogAction::Add { code, name, total } => {
                let default_total = match total {
                    Some(raw) => parse_total(raw)?,
                    None => 0,
                };
                let entry = Catalog::add(&mut pool, code, name, default_total)?;

                audit(
                    &pool,
                    "catalog",
                    &entry.code,
                    &format!("Added '{}' (default total {})", entry.name, entry.default_total),
                );
                success(format!("Added {} – {} to the catalog.", entry.code, entry.name));
            }

            CatalogAction::List => {
                let entries = Catalog::list(&mut pool)?;
                if entries.is_empty() {
                    info("The catalog is empty. Add subjects with `catalog add` or `catalog import`.");
                    return Ok(());
                }

                let mut table = Table::new(["Code", "Name", "Default total"]);
                for e in entries {
                    table.add_row(vec![e.code, e.name, e.default_total.to_string()]);
                }
                print!("{}", table.render(&cfg.separator_char));
            }

            CatalogAction::Import { file } => {
                let n = Catalog::import(&mut pool, Path::new(file))?;
                audit(&pool, "catalog", file, &format!("Imported {} subjects", n));
                success(format!("Imported {} subjects from {}.", n, file));
            }
        }
    }

    Ok(())
}
