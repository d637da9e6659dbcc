//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority)                              │
//! │     --backend sqlite --db ./cart.db                                    │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     SHOPPING_BACKEND=sqlite                                            │
//! │     SHOPPING_DB_PATH=./cart.db                                         │
//! │     SHOPPING_PAGE_SIZE=10                                              │
//! │     SHOPPING_LOG=debug                                                 │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/shopping/config.toml (Linux)                             │
//! │     ~/Library/Application Support/com.shopping.cart/config.toml (macOS)│
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! backend = "sqlite"   # memory | sqlite
//!
//! [database]
//! path = "/home/me/shopping.db"
//!
//! [cart]
//! page_size = 5
//!
//! [logging]
//! filter = "warn,shopping=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{CliError, CliResult};

const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Backend Kind
// =============================================================================

/// Which `CartStore` the CLI drives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-process store; the cart lives for one invocation.
    #[default]
    Memory,

    /// Worker-backed SQLite store; the cart persists.
    Sqlite,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendKind::Memory),
            "sqlite" | "db" => Ok(BackendKind::Sqlite),
            other => Err(CliError::InvalidConfig(format!(
                "Unknown backend: '{}'. Valid options: memory, sqlite",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file holding the cart and the catalog.
    /// Default: `shopping.db` in the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSettings {
    /// Lines per page for `show`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    shopping_core::DEFAULT_CART_PAGE_SIZE
}

impl Default for CartSettings {
    fn default() -> Self {
        CartSettings {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives. `RUST_LOG` wins if set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Effective configuration of one `shopping` invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub cart: CartSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// File this configuration was read from, if any. Recorded instead of
    /// logged because tracing starts only once the configuration is known.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Loads defaults, then the config file, then environment overrides,
    /// and validates the result.
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// default config file is not.
    pub fn load(config_path: Option<&Path>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::read_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::read_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn read_file(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<&Path>) -> CliResult<PathBuf> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path)
            .ok_or_else(|| CliError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml()?)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        if self.cart.page_size == 0 {
            return Err(CliError::InvalidConfig(
                "cart.page_size must be greater than 0".into(),
            ));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(CliError::InvalidConfig(
                "logging.filter must not be empty".into(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(CliError::InvalidConfig(
                    "database.path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies `SHOPPING_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any variable source. Unparseable values are
    /// ignored, as they are for the process environment.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = var("SHOPPING_BACKEND") {
            if let Ok(parsed) = backend.parse() {
                self.backend = parsed;
            }
        }

        if let Some(path) = var("SHOPPING_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(size) = var("SHOPPING_PAGE_SIZE") {
            if let Ok(size) = size.parse::<usize>() {
                self.cart.page_size = size;
            }
        }

        if let Some(filter) = var("SHOPPING_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopping", "cart")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The database file to use: the configured path, or the default file
    /// that `seed` also writes to.
    pub fn database_path(&self) -> CliResult<PathBuf> {
        match &self.database.path {
            Some(path) => Ok(path.clone()),
            None => Ok(shopping_db::default_database_path()?),
        }
    }
}
