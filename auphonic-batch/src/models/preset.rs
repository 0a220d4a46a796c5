//! Preset definitions and summaries

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key that names a preset
pub const PRESET_NAME_KEY: &str = "preset_name";

/// Entry of the `GET presets.json` listing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresetSummary {
    pub preset_name: String,
    pub uuid: String,
}

impl PresetSummary {
    /// Preset names compare case-insensitively
    pub fn matches_name(&self, name: &str) -> bool {
        self.preset_name.to_lowercase() == name.to_lowercase()
    }
}

/// Local preset definition, sent verbatim when the preset is created
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDefinition(Map<String, Value>);

impl PresetDefinition {
    /// Wrap a JSON value; only objects are accepted
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ClientError::Validation(format!(
                "Preset definition must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Preset name, required for lookup and creation
    pub fn name(&self) -> Result<&str, ClientError> {
        match self.0.get(PRESET_NAME_KEY) {
            Some(Value::String(name)) if !name.trim().is_empty() => Ok(name),
            Some(_) => Err(ClientError::Validation(format!(
                "Preset '{}' must be a non-empty string",
                PRESET_NAME_KEY
            ))),
            None => Err(ClientError::Validation(format!(
                "Preset is missing required '{}' key",
                PRESET_NAME_KEY
            ))),
        }
    }

    /// Definition as a JSON object body
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
