//! Preset lookup and creation
//!
//! `ensure_preset` lists the remote presets, matches by name ignoring case,
//! and only creates the preset when no match exists. Lookup and create are
//! two separate calls, so two concurrent callers could both create the same
//! preset; the batch driver only ever calls this from one task.

use crate::error::{ClientError, ClientResult};
use crate::models::{Envelope, PresetDefinition, PresetSummary, UuidRecord};
use crate::services::api_client::AuphonicApi;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

const PRESETS_RESOURCE: &str = "presets.json";

/// Ensures a named preset exists remotely
pub struct PresetManager {
    api: Arc<dyn AuphonicApi>,
}

impl PresetManager {
    pub fn new(api: Arc<dyn AuphonicApi>) -> Self {
        Self { api }
    }

    /// Return the UUID of the preset named in `definition`, creating it if absent
    pub async fn ensure_preset(&self, definition: &PresetDefinition) -> ClientResult<String> {
        let name = definition.name()?;
        tracing::info!(preset = name, "Looking up preset");

        if let Some(existing) = self.find_preset(name).await? {
            tracing::info!(preset = name, uuid = %existing.uuid, "Preset already exists");
            return Ok(existing.uuid);
        }

        tracing::info!(preset = name, "Preset not found; creating now");
        let body = definition.to_value();
        let response = self.api.post(PRESETS_RESOURCE, Some(&body)).await?;
        let created: Envelope<UuidRecord> =
            serde_json::from_value(response).map_err(|e| ClientError::Parse(e.to_string()))?;

        tracing::info!(preset = name, uuid = %created.data.uuid, "Preset added");
        Ok(created.data.uuid)
    }

    /// Case-insensitive search of the remote preset list
    pub async fn find_preset(&self, name: &str) -> ClientResult<Option<PresetSummary>> {
        let response = self.api.get(PRESETS_RESOURCE).await?;
        let listing: Envelope<Vec<PresetSummary>> =
            serde_json::from_value(response).map_err(|e| ClientError::Parse(e.to_string()))?;

        Ok(listing.data.into_iter().find(|p| p.matches_name(name)))
    }
}

/// Read a preset definition from a JSON file
pub fn load_definition(path: &Path) -> ClientResult<PresetDefinition> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|e| {
        ClientError::Validation(format!("Invalid preset file {}: {}", path.display(), e))
    })?;
    PresetDefinition::from_value(value)
}
