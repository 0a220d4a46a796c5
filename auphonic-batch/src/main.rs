//! auphonic-batch - Batch audio production through the Auphonic API
//!
//! Finds input files in the input folder, makes sure the preset exists,
//! then creates, uploads, produces and downloads one production per file.
//! Results land in `<input_dir>/auphonic-results`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auphonic_batch::config::{BatchConfig, ConfigOverrides};
use auphonic_batch::services::preset_manager::load_definition;
use auphonic_batch::services::{AuphonicApi, AuphonicClient, BatchRunner, FileScanner};

/// Command-line arguments for auphonic-batch
#[derive(Parser, Debug)]
#[command(name = "auphonic-batch")]
#[command(about = "Process a folder of audio files with an Auphonic preset")]
#[command(version)]
struct Args {
    /// Auphonic account name
    #[arg(long, env = "AUPHONIC_USERNAME")]
    username: Option<String>,

    /// Auphonic account password
    #[arg(long, env = "AUPHONIC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Folder containing the input audio files
    #[arg(short, long, env = "AUPHONIC_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// JSON preset definition (default: <input_dir>/preset.json)
    #[arg(short, long, env = "AUPHONIC_PRESET_FILE")]
    preset_file: Option<PathBuf>,

    /// Extension of the files to process
    #[arg(short, long, default_value = "wav")]
    extension: String,

    /// Match the extension regardless of case
    #[arg(long)]
    ignore_case: bool,

    /// API base URL
    #[arg(long, env = "AUPHONIC_BASE_URL")]
    base_url: Option<String>,

    /// Seconds between production status checks
    #[arg(long)]
    poll_interval_secs: Option<u64>,

    /// Status checks before a production is declared timed out
    #[arg(long)]
    max_poll_attempts: Option<u32>,

    /// Outputs at or below this many bytes count as failures
    #[arg(long)]
    min_output_bytes: Option<u64>,

    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            username: self.username.clone(),
            password: self.password.clone(),
            input_dir: self.input_dir.clone(),
            preset_file: self.preset_file.clone(),
            base_url: self.base_url.clone(),
            poll_interval_secs: self.poll_interval_secs,
            max_poll_attempts: self.max_poll_attempts,
            min_output_bytes: self.min_output_bytes,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.quiet {
        "auphonic_batch=warn,auphonic_common=warn"
    } else {
        "auphonic_batch=info,auphonic_common=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting auphonic-batch {}", env!("CARGO_PKG_VERSION"));

    let toml_config = auphonic_common::config::load_default_toml_config()
        .context("Failed to load configuration file")?;
    let config = BatchConfig::resolve(args.overrides(), &toml_config)
        .context("Invalid configuration")?;

    let scanner = if args.ignore_case {
        FileScanner::case_insensitive()
    } else {
        FileScanner::new()
    };
    let files = scanner
        .find_files(&config.folders.input_dir, &args.extension)
        .context("Failed to list input files")?;

    if files.is_empty() {
        info!(
            "No .{} files found in {}",
            args.extension,
            config.folders.input_dir.display()
        );
        return Ok(());
    }

    let definition = load_definition(&config.preset_file).with_context(|| {
        format!("Failed to load preset file {}", config.preset_file.display())
    })?;

    let client = AuphonicClient::with_options(
        config.credentials.clone(),
        &config.base_url,
        config.request_timeout,
    )
    .context("Failed to create Auphonic client")?;
    let api: Arc<dyn AuphonicApi> = Arc::new(client);

    let runner = BatchRunner::new(
        api,
        config.folders.output_dir.clone(),
        config.poll,
        config.min_output_bytes,
    );

    let report = runner
        .run(&files, &definition)
        .await
        .context("Batch aborted")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to render report")?
        );
    } else {
        println!("{}", report.summary());
    }

    if !report.all_succeeded() {
        std::process::exit(1);
    }

    Ok(())
}
