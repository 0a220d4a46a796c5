//! Production workflow
//!
//! Per input file:
//! CREATED → UPLOADED → STARTED → POLLING* → DONE | ERROR
//!
//! A production ending in ERROR is reported through the log and surfaced as
//! `Ok(None)` from [`ProductionWorkflow::produce_audio`] and `Ok(0)` from
//! [`ProductionWorkflow::process_file`], so batch callers can move on to the
//! next file. Everything else that goes wrong is a [`ClientError`].

use crate::error::{ClientError, ClientResult};
use crate::models::{CreateProductionRequest, Envelope, ProductionRecord, Status, UuidRecord};
use crate::services::api_client::AuphonicApi;
use crate::services::downloader::Downloader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Multipart field name expected by the upload endpoint
const UPLOAD_FIELD: &str = "input_file";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
/// One hour at the default interval
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 1200;

/// Status polling cadence and budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    max_attempts: u32,
}

impl PollPolicy {
    /// `max_attempts` must be at least 1
    pub fn new(interval: Duration, max_attempts: u32) -> ClientResult<Self> {
        if max_attempts == 0 {
            return Err(ClientError::Config(
                "max poll attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            interval,
            max_attempts,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Runs one input file through a remote production
pub struct ProductionWorkflow {
    api: Arc<dyn AuphonicApi>,
    downloader: Downloader,
    poll: PollPolicy,
}

impl ProductionWorkflow {
    pub fn new(api: Arc<dyn AuphonicApi>, output_dir: PathBuf, poll: PollPolicy) -> Self {
        let downloader = Downloader::new(api.clone(), output_dir);
        Self {
            api,
            downloader,
            poll,
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn output_dir(&self) -> &Path {
        self.downloader.output_dir()
    }

    /// Create an empty production for `input_file` using `preset_uuid`
    ///
    /// Returns the production UUID.
    pub async fn create_production(
        &self,
        input_file: &Path,
        preset_uuid: &str,
    ) -> ClientResult<String> {
        let title = input_file.to_string_lossy();
        tracing::info!(file = %title, "Starting prod record");

        let body = serde_json::to_value(CreateProductionRequest::new(preset_uuid, &title))
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        let response = self.api.post("productions.json", Some(&body)).await?;
        let created: Envelope<UuidRecord> =
            serde_json::from_value(response).map_err(|e| ClientError::Parse(e.to_string()))?;

        tracing::info!(file = %title, production = %created.data.uuid, "Completed prod record");
        Ok(created.data.uuid)
    }

    /// Upload the file bytes into an existing production
    ///
    /// Returns once the server has acknowledged the whole transfer.
    pub async fn upload_file(&self, input_file: &Path, prod_uuid: &str) -> ClientResult<()> {
        if !input_file.is_file() {
            return Err(ClientError::FileNotFound(input_file.to_path_buf()));
        }

        tracing::info!(file = %input_file.display(), production = prod_uuid, "Starting file upload");
        self.api
            .post_file(
                &format!("production/{}/upload.json", prod_uuid),
                UPLOAD_FIELD,
                input_file,
            )
            .await?;
        tracing::info!(file = %input_file.display(), production = prod_uuid, "Completed file upload");
        Ok(())
    }

    /// Start processing and wait for a terminal status
    ///
    /// Returns the first output file's download URL on DONE, `None` on ERROR.
    /// Fails with [`ClientError::Timeout`] once the poll budget is spent.
    pub async fn produce_audio(&self, prod_uuid: &str) -> ClientResult<Option<String>> {
        tracing::info!(production = prod_uuid, "Starting audio prod");
        self.api
            .post(&format!("production/{}/start.json", prod_uuid), None)
            .await?;

        let mut attempts = 0u32;
        loop {
            if attempts >= self.poll.max_attempts {
                return Err(ClientError::Timeout {
                    production: prod_uuid.to_string(),
                    attempts,
                });
            }

            tokio::time::sleep(self.poll.interval).await;
            attempts += 1;

            let (status, record) = self.fetch_status(prod_uuid).await?;
            tracing::debug!(
                production = prod_uuid,
                status = %status,
                attempt = attempts,
                "Polled production status"
            );

            if status.is_terminal() {
                return self.finish(prod_uuid, status, record);
            }
        }
    }

    /// Current status and record of a production
    pub async fn fetch_status(&self, prod_uuid: &str) -> ClientResult<(Status, ProductionRecord)> {
        let response = self
            .api
            .get(&format!("production/{}.json", prod_uuid))
            .await?;
        let envelope: Envelope<ProductionRecord> =
            serde_json::from_value(response).map_err(|e| ClientError::Parse(e.to_string()))?;
        let status = Status::from_code(envelope.data.status)?;
        Ok((status, envelope.data))
    }

    fn finish(
        &self,
        prod_uuid: &str,
        status: Status,
        record: ProductionRecord,
    ) -> ClientResult<Option<String>> {
        if !status.is_success() {
            let error_msg = record.error_message.unwrap_or_default();
            tracing::error!(
                production = prod_uuid,
                status = %status,
                error = %error_msg,
                "Production failed"
            );
            return Ok(None);
        }

        if record.output_files.len() > 1 {
            tracing::warn!(
                production = prod_uuid,
                outputs = record.output_files.len(),
                "Production has several output files; only the first is downloaded"
            );
        }

        let download_url = record
            .output_files
            .into_iter()
            .next()
            .and_then(|f| f.download_url)
            .ok_or_else(|| ClientError::MissingOutput(prod_uuid.to_string()))?;

        tracing::info!(production = prod_uuid, url = %download_url, "Production done");
        Ok(Some(download_url))
    }

    /// Download a finished output; see [`Downloader::download_file`]
    pub async fn download_file(&self, download_url: &str) -> ClientResult<u64> {
        self.downloader.download_file(download_url).await
    }

    /// create → upload → produce → download
    ///
    /// Returns the downloaded size in bytes, or 0 when the production ended
    /// in ERROR.
    pub async fn process_file(&self, input_file: &Path, preset_uuid: &str) -> ClientResult<u64> {
        let span = tracing::info_span!(
            "production_run",
            run_id = %Uuid::new_v4(),
            file = %input_file.display()
        );

        async {
            let prod_uuid = self.create_production(input_file, preset_uuid).await?;
            self.upload_file(input_file, &prod_uuid).await?;

            match self.produce_audio(&prod_uuid).await? {
                Some(download_url) => self.download_file(&download_url).await,
                None => Ok(0),
            }
        }
        .instrument(span)
        .await
    }
}
