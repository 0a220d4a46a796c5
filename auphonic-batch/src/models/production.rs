//! Production records and request bodies

use serde::{Deserialize, Serialize};

/// Response envelope used by every API resource: `{"data": ...}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Minimal view of a freshly created remote object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UuidRecord {
    pub uuid: String,
}

/// Production metadata; only the title is set by this client
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ProductionMetadata {
    #[serde(default)]
    pub title: Option<String>,
}

/// Body of `POST productions.json`
#[derive(Debug, Clone, Serialize)]
pub struct CreateProductionRequest {
    /// Preset UUID applied to the production
    pub preset: String,
    pub metadata: ProductionMetadata,
}

impl CreateProductionRequest {
    pub fn new(preset_uuid: &str, title: &str) -> Self {
        Self {
            preset: preset_uuid.to_string(),
            metadata: ProductionMetadata {
                title: Some(title.to_string()),
            },
        }
    }
}

/// Production state returned by `GET production/<uuid>.json`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductionRecord {
    pub uuid: String,
    /// Numeric status code, see [`crate::models::Status`]
    pub status: i64,
    #[serde(default)]
    pub status_string: Option<String>,
    #[serde(default)]
    pub output_files: Vec<OutputFile>,
    /// Only meaningful when the status is ERROR
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub metadata: Option<ProductionMetadata>,
}

/// One processed output of a finished production
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputFile {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}
