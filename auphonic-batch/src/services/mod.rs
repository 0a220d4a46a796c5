//! Services for driving Auphonic productions

pub mod api_client;
pub mod batch_runner;
pub mod downloader;
pub mod file_scanner;
pub mod preset_manager;
pub mod production_workflow;

pub use api_client::{AuphonicApi, AuphonicClient, Credentials, DownloadedFile};
pub use batch_runner::{BatchReport, BatchRunner, FileOutcome};
pub use downloader::Downloader;
pub use file_scanner::{FileScanner, ScanError};
pub use preset_manager::PresetManager;
pub use production_workflow::{PollPolicy, ProductionWorkflow};
