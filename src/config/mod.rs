use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_student")]
    pub student: String,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_onboarding_secret")]
    pub onboarding_secret: String,
    #[serde(default = "default_separator_char")]
    pub separator_char: String,
}

fn default_student() -> String {
    "me".to_string()
}
fn default_busy_timeout_ms() -> u64 {
    5000
}
fn default_onboarding_secret() -> String {
    // Unset until `init` writes a random one; onboarding refuses to run without it.
    String::new()
}
fn default_separator_char() -> String {
    "-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            student: default_student(),
            busy_timeout_ms: default_busy_timeout_ms(),
            onboarding_secret: default_onboarding_secret(),
            separator_char: default_separator_char(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("rattendance")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rattendance")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rattendance.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rattendance.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;

        if cfg.busy_timeout_ms == 0 {
            return Err(AppError::Config(
                "busy_timeout_ms must be greater than zero".into(),
            ));
        }

        Ok(cfg)
    }

    /// Initialize configuration and database files.
    ///
    /// In test mode the configuration file is left untouched and only the
    /// database file is created. Returns the configuration that was written.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        if !is_test {
            fs::create_dir_all(&dir)?;
        }

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() || is_test {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            onboarding_secret: uuid::Uuid::new_v4().simple().to_string(),
            ..Config::default()
        };

        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }

    /// Persist the current configuration to the standard location.
    pub fn save(&self) -> AppResult<()> {
        fs::create_dir_all(Self::config_dir())?;
        let yaml = serde_yaml::to_string(self)?;
        fs::write(Self::config_file(), yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rattendance.conf");
        fs::write(&path, "database: /tmp/x.sqlite\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.student, "me");
        assert_eq!(cfg.busy_timeout_ms, 5000);
        assert_eq!(cfg.separator_char, "-");
        assert!(cfg.onboarding_secret.is_empty());
    }

    #[test]
    fn zero_busy_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rattendance.conf");
        fs::write(&path, "database: x.sqlite\nbusy_timeout_ms: 0\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn absent_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.conf")).unwrap();
        assert_eq!(cfg.student, "me");
    }
}
