//! # CLI Configuration
//!
//! Where the database lives and how reports are printed.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --db ./shop.db                                                     │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     STOCKROOM_DB_PATH=./shop.db                                        │
//! │     STOCKROOM_CURRENCY=US$                                             │
//! │     STOCKROOM_REPORT_DIR=./reports                                     │
//! │                                                                         │
//! │  3. TOML Config File (--config, or the platform config dir)            │
//! │     ~/.config/stockroom/stockroom.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockroom.stockroom/... (macOS)  │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # stockroom.toml
//! [database]
//! path = "/var/lib/stockroom/stockroom.db"
//! max_connections = 5
//!
//! [report]
//! currency_symbol = "R$"
//! output_dir = "/srv/reports"   # optional; reports go to stdout without it
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use stockroom_db::DbConfig;
use stockroom_report::ReportOptions;

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "stockroom.toml";

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, created on first use.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("com", "stockroom", "stockroom")
        .map(|dirs| dirs.data_dir().join("stockroom.db"))
        .unwrap_or_else(|| PathBuf::from("stockroom.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Directory reports are saved to when no `--out` is given.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            currency_symbol: default_currency_symbol(),
            output_dir: None,
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default file is not.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else if explicit {
                return Err(AppError::InvalidConfig(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::InvalidConfig(
                "database.path must not be empty".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.report.currency_symbol.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "report.currency_symbol must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies `STOCKROOM_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STOCKROOM_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(symbol) = lookup("STOCKROOM_CURRENCY") {
            self.report.currency_symbol = symbol;
        }

        if let Some(dir) = lookup("STOCKROOM_REPORT_DIR") {
            debug!(dir = %dir, "Overriding report directory from environment");
            self.report.output_dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockroom", "stockroom")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Pool settings for the configured database file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    /// Report options stamped with the current local time.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions::new(self.report.currency_symbol.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.report.currency_symbol, "R$");
        assert!(config.report.output_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 2;
        config.report.currency_symbol = "  ".to_string();
        assert!(config.validate().is_err());

        config.report.currency_symbol = "$".to_string();
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [report]
            currency_symbol = "US$"
            "#,
        )
        .unwrap();

        assert_eq!(config.report.currency_symbol, "US$");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[database]\npath = \"shop.db\"\nmax_connections = 2\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.database.path, PathBuf::from("shop.db"));
        assert_eq!(config.db_config().max_connections, 2);
    }

    #[test]
    fn test_bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[database\n").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load(Some(dir.path().join("absent.toml")));
        assert!(matches!(result, Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("STOCKROOM_DB_PATH", "/tmp/other.db"),
            ("STOCKROOM_CURRENCY", "€"),
            ("STOCKROOM_REPORT_DIR", "/tmp/reports"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.report.currency_symbol, "€");
        assert_eq!(
            config.report.output_dir,
            Some(PathBuf::from("/tmp/reports"))
        );
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[report]"));
    }
}
