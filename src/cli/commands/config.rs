use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{error, success, warning};
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        if *print_config {
            println!("📄 Current configuration:\n");
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *edit_config {
            let path = Config::config_file();
            if !path.exists() {
                cfg.save()?;
            }

            let default_editor = std::env::var("EDITOR")
                .or_else(|_| std::env::var("VISUAL"))
                .unwrap_or_else(|_| {
                    if cfg!(target_os = "windows") {
                        "notepad".to_string()
                    } else {
                        "nano".to_string()
                    }
                });
            let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

            let edited = |ed: &str| {
                Command::new(ed)
                    .arg(&path)
                    .status()
                    .map(|s| s.success())
                    .unwrap_or(false)
            };

            if edited(&editor_to_use) {
                success(format!("Configuration edited with '{}'", editor_to_use));
            } else {
                warning(format!(
                    "Editor '{}' not available, falling back to '{}'",
                    editor_to_use, default_editor
                ));
                if edited(&default_editor) {
                    success(format!("Configuration edited with '{}'", default_editor));
                } else {
                    error(format!("Failed to edit configuration with '{}'", default_editor));
                }
            }
        }
    }

    Ok(())
}
