//! Output file download
//!
//! Output files are named after the last path segment of the resolved
//! download URL, prefixed with `auphonic-`, and written to the output folder.

use crate::error::{ClientError, ClientResult};
use crate::services::api_client::AuphonicApi;
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix that distinguishes processed files from their sources
pub const OUTPUT_PREFIX: &str = "auphonic-";

/// Downloads finished production outputs
pub struct Downloader {
    api: Arc<dyn AuphonicApi>,
    output_dir: PathBuf,
}

impl Downloader {
    pub fn new(api: Arc<dyn AuphonicApi>, output_dir: PathBuf) -> Self {
        Self { api, output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch `download_url` and write it to the output folder
    ///
    /// Returns the size announced by the `Content-Length` header. When the
    /// header is missing, the number of bytes written is returned instead.
    pub async fn download_file(&self, download_url: &str) -> ClientResult<u64> {
        tracing::info!(url = download_url, "Starting file download");

        let downloaded = self.api.fetch_absolute(download_url).await?;
        let outfile = output_path_for(&self.output_dir, &downloaded.final_url)?;

        tokio::fs::write(&outfile, &downloaded.body).await?;
        let written = downloaded.body.len() as u64;

        let size_bytes = match downloaded.content_length {
            Some(declared) => {
                if declared != written {
                    tracing::warn!(
                        declared = declared,
                        written = written,
                        outfile = %outfile.display(),
                        "Content-Length does not match bytes written"
                    );
                }
                declared
            }
            None => {
                tracing::warn!(
                    outfile = %outfile.display(),
                    "No Content-Length header; reporting bytes written"
                );
                written
            }
        };

        tracing::info!(
            outfile = %outfile.display(),
            size_bytes = size_bytes,
            "Completed file download"
        );

        Ok(size_bytes)
    }
}

/// `<output_dir>/auphonic-<last URL path segment>`
pub fn output_path_for(output_dir: &Path, url: &str) -> ClientResult<PathBuf> {
    let parsed = Url::parse(url)
        .map_err(|e| ClientError::Validation(format!("Invalid download URL {}: {}", url, e)))?;
    let name = remote_file_name(&parsed)
        .ok_or_else(|| ClientError::Validation(format!("No file name in URL: {}", url)))?;
    Ok(output_dir.join(format!("{}{}", OUTPUT_PREFIX, name)))
}

/// Last non-empty path segment
fn remote_file_name(url: &Url) -> Option<&str> {
    url.path_segments()?
        .rev()
        .find(|segment| !segment.is_empty())
}
