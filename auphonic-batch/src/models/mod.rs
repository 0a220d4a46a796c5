//! Data models for the Auphonic API

pub mod preset;
pub mod production;
pub mod status;

pub use preset::{PresetDefinition, PresetSummary};
pub use production::{
    CreateProductionRequest, Envelope, OutputFile, ProductionMetadata, ProductionRecord,
    UuidRecord,
};
pub use status::Status;
