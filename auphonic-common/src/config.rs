//! Configuration loading and input folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable holding the Auphonic account name
pub const ENV_USERNAME: &str = "AUPHONIC_USERNAME";
/// Environment variable holding the Auphonic account password
pub const ENV_PASSWORD: &str = "AUPHONIC_PASSWORD";
/// Environment variable overriding the input folder
pub const ENV_INPUT_DIR: &str = "AUPHONIC_INPUT_DIR";

/// Optional settings read from `config.toml`
///
/// Every field is optional; command-line arguments and environment
/// variables take precedence over anything set here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Folder scanned for input audio files
    #[serde(default)]
    pub input_dir: Option<PathBuf>,

    /// API base URL (default: https://auphonic.com/api)
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Seconds between production status checks
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,

    /// Status checks allowed before a production is declared timed out
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,

    /// Output files at or below this size are counted as failures
    #[serde(default)]
    pub min_output_bytes: Option<u64>,
}

/// Parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load the platform configuration file, or defaults when none exists
pub fn load_default_toml_config() -> Result<TomlConfig> {
    match default_config_path() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            load_toml_config(&path)
        }
        None => {
            debug!("No configuration file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Locate the configuration file for the platform
///
/// Linux checks `~/.config/auphonic/config.toml` first, then
/// `/etc/auphonic/config.toml`. Other platforms only check the user
/// configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("auphonic").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/auphonic/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the input folder
///
/// Priority order:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. `~/Desktop/auphonic`
pub fn resolve_input_dir(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if is_valid_value(&path) {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.input_dir {
        return path.clone();
    }

    let fallback = default_input_dir();
    info!("{} not supplied; using {}", env_var_name, fallback.display());
    fallback
}

/// OS-dependent default input folder
pub fn default_input_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Desktop")))
        .map(|d| d.join("auphonic"))
        .unwrap_or_else(|| PathBuf::from("./auphonic"))
}

/// Read a required environment variable
///
/// Fails with a configuration error when the variable is unset or blank.
pub fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if is_valid_value(&value) => Ok(value),
        _ => Err(Error::Config(format!("Must define {} environment var", name))),
    }
}

/// Non-empty, non-whitespace
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}
