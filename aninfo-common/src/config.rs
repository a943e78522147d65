//! Configuration loading and resolution
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`ANINFO_WATCH_DIR`, `ANINFO_LEDGER_PATH`)
//! 2. TOML config file (`$ANINFO_CONFIG`, else `<config_dir>/aninfo/config.toml`)
//! 3. Compiled defaults
//!
//! A missing TOML file is not an error; the service starts on defaults with a warning.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit TOML config file
pub const CONFIG_ENV_VAR: &str = "ANINFO_CONFIG";
/// Environment variable overriding the watched directory
pub const WATCH_DIR_ENV_VAR: &str = "ANINFO_WATCH_DIR";
/// Environment variable overriding the processed-files ledger location
pub const LEDGER_PATH_ENV_VAR: &str = "ANINFO_LEDGER_PATH";

/// AniList asks clients to stay under its quota; this is the floor for the
/// pause taken after every id translation request.
pub const MIN_TRANSLATION_COOLDOWN_SECS: u64 = 10;

/// Top-level configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Root of the anime library that is scanned for `tvshow.nfo` directories
    #[serde(default = "default_watch_dir")]
    pub watch_dir: PathBuf,

    /// Append-only ledger of processed metadata files
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Pause between full scans of the watch directory
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,

    /// Pause after each AniList id translation request
    #[serde(default = "default_translation_cooldown_secs")]
    pub translation_cooldown_secs: u64,

    /// External service settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP client settings shared by the AniList and Jikan clients
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Total request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// AniList GraphQL endpoint
    #[serde(default = "default_anilist_url")]
    pub anilist_url: String,

    /// Jikan v4 base URL (no trailing slash)
    #[serde(default = "default_jikan_url")]
    pub jikan_url: String,

    /// Jikan public API quota
    #[serde(default = "default_jikan_requests_per_second")]
    pub jikan_requests_per_second: u32,

    /// Upper bound on episode listing pages fetched per show
    #[serde(default = "default_jikan_max_episode_pages")]
    pub jikan_max_episode_pages: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_watch_dir() -> PathBuf {
    dirs::video_dir()
        .map(|d| d.join("anime"))
        .unwrap_or_else(|| PathBuf::from("anime"))
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("processed_files.log")
}

fn default_scan_interval_secs() -> u64 {
    60
}

fn default_translation_cooldown_secs() -> u64 {
    MIN_TRANSLATION_COOLDOWN_SECS
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("aninfo/{}", env!("CARGO_PKG_VERSION"))
}

fn default_anilist_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_jikan_url() -> String {
    "https://api.jikan.moe/v4".to_string()
}

fn default_jikan_requests_per_second() -> u32 {
    3
}

fn default_jikan_max_episode_pages() -> u32 {
    20
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            watch_dir: default_watch_dir(),
            ledger_path: default_ledger_path(),
            scan_interval_secs: default_scan_interval_secs(),
            translation_cooldown_secs: default_translation_cooldown_secs(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            anilist_url: default_anilist_url(),
            jikan_url: default_jikan_url(),
            jikan_requests_per_second: default_jikan_requests_per_second(),
            jikan_max_episode_pages: default_jikan_max_episode_pages(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Apply environment variable overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = non_empty_env(WATCH_DIR_ENV_VAR) {
            info!("Watch directory overridden by {}", WATCH_DIR_ENV_VAR);
            self.watch_dir = PathBuf::from(dir);
        }

        if let Some(path) = non_empty_env(LEDGER_PATH_ENV_VAR) {
            info!("Ledger path overridden by {}", LEDGER_PATH_ENV_VAR);
            self.ledger_path = PathBuf::from(path);
        }
    }

    /// Reject values the scan loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scan_interval_secs == 0 {
            return Err(Error::Config("scan_interval_secs must be greater than 0".to_string()));
        }

        if self.translation_cooldown_secs < MIN_TRANSLATION_COOLDOWN_SECS {
            return Err(Error::Config(format!(
                "translation_cooldown_secs must be at least {} (got {})",
                MIN_TRANSLATION_COOLDOWN_SECS, self.translation_cooldown_secs
            )));
        }

        if self.http.jikan_requests_per_second == 0 {
            return Err(Error::Config(
                "http.jikan_requests_per_second must be greater than 0".to_string(),
            ));
        }

        if self.http.jikan_max_episode_pages == 0 {
            return Err(Error::Config(
                "http.jikan_max_episode_pages must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }

    pub fn translation_cooldown(&self) -> Duration {
        Duration::from_secs(self.translation_cooldown_secs)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Location of the TOML config file
///
/// `$ANINFO_CONFIG` when set, otherwise `<config_dir>/aninfo/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = non_empty_env(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|d| d.join("aninfo").join("config.toml"))
}

/// Load a TOML config file, falling back to defaults when it does not exist
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config = TomlConfig::from_toml_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the effective configuration: file (or defaults), then environment, then validation
pub fn resolve_config() -> Result<TomlConfig> {
    let mut config = match config_file_path() {
        Some(path) => load_toml_config(&path)?,
        None => {
            warn!("Could not determine config directory, using built-in defaults");
            TomlConfig::default()
        }
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
