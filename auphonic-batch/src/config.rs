//! Configuration resolution for auphonic-batch
//!
//! Command-line arguments (which clap already backs with environment
//! variables) take priority over the TOML file, which takes priority over
//! compiled defaults. Missing credentials and a missing input folder are
//! reported before any request is made.

use crate::error::{ClientError, ClientResult};
use crate::services::api_client::{Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::services::batch_runner::DEFAULT_MIN_OUTPUT_BYTES;
use crate::services::production_workflow::{
    PollPolicy, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS,
};
use auphonic_common::config::{
    is_valid_value, resolve_input_dir, TomlConfig, ENV_INPUT_DIR, ENV_PASSWORD, ENV_USERNAME,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sub-folder of the input folder receiving processed files
pub const OUTPUT_DIR_NAME: &str = "auphonic-results";

/// Preset definition looked up in the input folder when none is given
pub const DEFAULT_PRESET_FILE: &str = "preset.json";

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub input_dir: Option<PathBuf>,
    pub preset_file: Option<PathBuf>,
    pub base_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_poll_attempts: Option<u32>,
    pub min_output_bytes: Option<u64>,
}

/// Fully resolved settings for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub credentials: Credentials,
    pub folders: WorkFolders,
    pub preset_file: PathBuf,
    pub base_url: String,
    pub request_timeout: Duration,
    pub poll: PollPolicy,
    pub min_output_bytes: u64,
}

impl BatchConfig {
    pub fn resolve(overrides: ConfigOverrides, toml_config: &TomlConfig) -> ClientResult<Self> {
        let username = pick(overrides.username, toml_config.username.clone())
            .ok_or_else(|| missing_credential(ENV_USERNAME))?;
        let password = pick(overrides.password, toml_config.password.clone())
            .ok_or_else(|| missing_credential(ENV_PASSWORD))?;
        let credentials = Credentials::new(username, password)?;

        let input_dir = resolve_input_dir(overrides.input_dir.as_deref(), ENV_INPUT_DIR, toml_config);
        let folders = WorkFolders::open(&input_dir)?;

        let preset_file = overrides
            .preset_file
            .unwrap_or_else(|| folders.input_dir.join(DEFAULT_PRESET_FILE));

        let base_url = pick(overrides.base_url, toml_config.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let poll_interval_secs = overrides
            .poll_interval_secs
            .or(toml_config.poll_interval_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let max_poll_attempts = overrides
            .max_poll_attempts
            .or(toml_config.max_poll_attempts)
            .unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS);
        let poll = PollPolicy::new(Duration::from_secs(poll_interval_secs), max_poll_attempts)?;

        let min_output_bytes = overrides
            .min_output_bytes
            .or(toml_config.min_output_bytes)
            .unwrap_or(DEFAULT_MIN_OUTPUT_BYTES);

        tracing::info!(
            username = credentials.username(),
            input_dir = %folders.input_dir.display(),
            output_dir = %folders.output_dir.display(),
            base_url = %base_url,
            "Configuration resolved"
        );

        Ok(Self {
            credentials,
            folders,
            preset_file,
            base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll,
            min_output_bytes,
        })
    }
}

/// Input folder and its `auphonic-results` output folder
#[derive(Debug, Clone, PartialEq)]
pub struct WorkFolders {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl WorkFolders {
    /// The input folder must already exist; the output folder is created
    pub fn open(input_dir: &Path) -> ClientResult<Self> {
        if !input_dir.is_dir() {
            return Err(ClientError::Config(format!(
                "input dir {} does not exist",
                input_dir.display()
            )));
        }

        let output_dir = input_dir.join(OUTPUT_DIR_NAME);
        if !output_dir.exists() {
            std::fs::create_dir_all(&output_dir)?;
            tracing::info!(output_dir = %output_dir.display(), "Created output folder");
        }

        Ok(Self {
            input_dir: input_dir.to_path_buf(),
            output_dir,
        })
    }
}

fn pick(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|v| is_valid_value(v))
        .or_else(|| fallback.filter(|v| is_valid_value(v)))
}

fn missing_credential(var: &str) -> ClientError {
    ClientError::Config(format!("Must define {} environment var", var))
}
