//! # Auphonic Common Library
//!
//! Shared code for the Auphonic batch tooling:
//! - Error type used across crates
//! - Configuration file loading and input folder resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
