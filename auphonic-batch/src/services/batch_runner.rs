//! Batch driver
//!
//! Ensures the preset once, then runs every input file through the
//! production workflow one after another and tallies the results.

use crate::error::ClientResult;
use crate::models::PresetDefinition;
use crate::services::api_client::AuphonicApi;
use crate::services::preset_manager::PresetManager;
use crate::services::production_workflow::{PollPolicy, ProductionWorkflow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Outputs at or below this size are treated as empty or error stubs
pub const DEFAULT_MIN_OUTPUT_BYTES: u64 = 50_000;

/// Result for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub input_file: PathBuf,
    /// Bytes downloaded; 0 when the production ended in ERROR
    pub bytes: u64,
    pub success: bool,
}

/// Summary of a batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub preset_uuid: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub min_output_bytes: u64,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn new(preset_uuid: String, min_output_bytes: u64) -> Self {
        Self {
            preset_uuid,
            started_at: Utc::now(),
            finished_at: None,
            min_output_bytes,
            outcomes: Vec::new(),
        }
    }

    /// Record the byte count of one file; success means strictly above the threshold
    pub fn record(&mut self, input_file: PathBuf, bytes: u64) -> &FileOutcome {
        let success = bytes > self.min_output_bytes;
        self.outcomes.push(FileOutcome {
            input_file,
            bytes,
            success,
        });
        &self.outcomes[self.outcomes.len() - 1]
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// e.g. "2 of 3 files processed successfully"
    pub fn summary(&self) -> String {
        format!(
            "{} of {} files processed successfully",
            self.succeeded(),
            self.total()
        )
    }
}

/// Sequential batch processor
pub struct BatchRunner {
    presets: PresetManager,
    workflow: ProductionWorkflow,
    min_output_bytes: u64,
}

impl BatchRunner {
    pub fn new(
        api: Arc<dyn AuphonicApi>,
        output_dir: PathBuf,
        poll: PollPolicy,
        min_output_bytes: u64,
    ) -> Self {
        Self {
            presets: PresetManager::new(api.clone()),
            workflow: ProductionWorkflow::new(api, output_dir, poll),
            min_output_bytes,
        }
    }

    pub fn workflow(&self) -> &ProductionWorkflow {
        &self.workflow
    }

    /// Process `files` with the preset described by `definition`
    ///
    /// A production that ends in ERROR only marks its file as failed; any
    /// [`crate::ClientError`] aborts the remaining files.
    pub async fn run(
        &self,
        files: &[PathBuf],
        definition: &PresetDefinition,
    ) -> ClientResult<BatchReport> {
        let preset_uuid = self.presets.ensure_preset(definition).await?;
        let mut report = BatchReport::new(preset_uuid, self.min_output_bytes);

        tracing::info!(
            files = files.len(),
            preset = %report.preset_uuid,
            "Starting batch"
        );

        for input_file in files {
            tracing::info!(file = %input_file.display(), "Starting file");
            let bytes = self
                .workflow
                .process_file(input_file, &report.preset_uuid)
                .await?;

            let outcome = report.record(input_file.clone(), bytes);
            if outcome.success {
                tracing::info!(file = %input_file.display(), bytes = bytes, "File processed");
            } else {
                tracing::warn!(
                    file = %input_file.display(),
                    bytes = bytes,
                    "File did not produce a usable output"
                );
            }
        }

        report.finish();
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Batch complete"
        );
        Ok(report)
    }
}
