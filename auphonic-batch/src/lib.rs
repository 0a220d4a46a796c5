//! auphonic-batch library interface
//!
//! Drives the Auphonic REST API: preset management, production creation,
//! upload, polling and download of the processed result.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ClientError, ClientResult};
