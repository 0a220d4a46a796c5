//! Auphonic API client
//!
//! Basic-auth HTTP requests against the Auphonic REST API. One
//! `reqwest::Client` is kept for the lifetime of the client so the
//! connection is reused across calls. No retry or backoff: every transport
//! fault or non-success status is returned to the caller immediately.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://auphonic.com/api";
const USER_AGENT: &str = concat!("auphonic-batch/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Account credentials, attached to every request
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Both values must be non-blank
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> ClientResult<Self> {
        let username = username.into();
        let password = password.into();

        if username.trim().is_empty() {
            return Err(ClientError::Config("Auphonic username is empty".to_string()));
        }
        if password.trim().is_empty() {
            return Err(ClientError::Config("Auphonic password is empty".to_string()));
        }

        Ok(Self { username, password })
    }

    /// Read `AUPHONIC_USERNAME` and `AUPHONIC_PASSWORD`
    pub fn from_env() -> ClientResult<Self> {
        let username = auphonic_common::config::require_env(auphonic_common::config::ENV_USERNAME)?;
        let password = auphonic_common::config::require_env(auphonic_common::config::ENV_PASSWORD)?;
        Self::new(username, password)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body and metadata of an absolute-URL download
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// URL after redirects were followed
    pub final_url: String,
    /// Value of the `Content-Length` header, if present and numeric
    pub content_length: Option<u64>,
    pub body: Vec<u8>,
}

/// Operations the workflow needs from the remote API
///
/// Resources are relative to the API base (`presets.json`,
/// `production/<uuid>.json`, ...). `fetch_absolute` takes a fully
/// qualified URL and must not prefix it.
#[async_trait]
pub trait AuphonicApi: Send + Sync {
    async fn get(&self, resource: &str) -> ClientResult<Value>;

    /// POST with an optional JSON body
    async fn post(&self, resource: &str, body: Option<&Value>) -> ClientResult<Value>;

    /// POST a local file as multipart form data under `field`
    async fn post_file(&self, resource: &str, field: &str, path: &Path) -> ClientResult<Value>;

    /// Authenticated GET of an absolute URL
    async fn fetch_absolute(&self, url: &str) -> ClientResult<DownloadedFile>;
}

/// reqwest-backed implementation of [`AuphonicApi`]
pub struct AuphonicClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl AuphonicClient {
    pub fn new(credentials: Credentials) -> ClientResult<Self> {
        Self::with_options(
            credentials,
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_options(
        credentials: Credentials,
        base_url: &str,
        timeout: Duration,
    ) -> ClientResult<Self> {
        if base_url.trim().is_empty() {
            return Err(ClientError::Config("API base URL is empty".to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        tracing::debug!(
            username = credentials.username(),
            base_url = base_url,
            "Auphonic client created"
        );

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/<resource>`
    pub fn resource_url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = self
            .credentials
            .apply(request)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json(&self, request: RequestBuilder) -> ClientResult<Value> {
        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AuphonicApi for AuphonicClient {
    async fn get(&self, resource: &str) -> ClientResult<Value> {
        let url = self.resource_url(resource);
        tracing::debug!(url = %url, "GET");
        self.send_json(self.http_client.get(url)).await
    }

    async fn post(&self, resource: &str, body: Option<&Value>) -> ClientResult<Value> {
        let url = self.resource_url(resource);
        tracing::debug!(url = %url, has_body = body.is_some(), "POST");

        let mut request = self.http_client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        self.send_json(request).await
    }

    async fn post_file(&self, resource: &str, field: &str, path: &Path) -> ClientResult<Value> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let url = self.resource_url(resource);
        tracing::debug!(url = %url, bytes = bytes.len(), file = %file_name, "POST multipart");

        let form = Form::new().part(field.to_string(), Part::bytes(bytes).file_name(file_name));
        self.send_json(self.http_client.post(url).multipart(form))
            .await
    }

    async fn fetch_absolute(&self, url: &str) -> ClientResult<DownloadedFile> {
        tracing::debug!(url = %url, "GET absolute");
        let response = self.send(self.http_client.get(url)).await?;

        let final_url = response.url().to_string();
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?
            .to_vec();

        Ok(DownloadedFile {
            final_url,
            content_length,
            body,
        })
    }
}
