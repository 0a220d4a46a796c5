//! Production status codes
//!
//! Codes as published at https://auphonic.com/api/info/production_status.json

use crate::error::ClientError;
use std::fmt;

/// Remote processing stage of a production
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    FileUpload,
    Waiting,
    Error,
    Done,
    AudioProcessing,
    AudioEncoding,
    OutputFileTransfer,
    MonoMixdown,
    SplitAudio,
    Incomplete,
    NotStarted,
    Outdated,
    InputFileTransfer,
    Stopped,
    SpeechRecognition,
}

impl Status {
    /// Decode a numeric status code
    ///
    /// Unknown codes are rejected rather than treated as "still running",
    /// so a new remote status cannot trap the poll loop.
    pub fn from_code(code: i64) -> Result<Self, ClientError> {
        let status = match code {
            0 => Self::FileUpload,
            1 => Self::Waiting,
            2 => Self::Error,
            3 => Self::Done,
            4 => Self::AudioProcessing,
            5 => Self::AudioEncoding,
            6 => Self::OutputFileTransfer,
            7 => Self::MonoMixdown,
            8 => Self::SplitAudio,
            9 => Self::Incomplete,
            10 => Self::NotStarted,
            11 => Self::Outdated,
            12 => Self::InputFileTransfer,
            13 => Self::Stopped,
            14 => Self::SpeechRecognition,
            other => return Err(ClientError::UnknownStatus(other)),
        };
        Ok(status)
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::FileUpload => 0,
            Self::Waiting => 1,
            Self::Error => 2,
            Self::Done => 3,
            Self::AudioProcessing => 4,
            Self::AudioEncoding => 5,
            Self::OutputFileTransfer => 6,
            Self::MonoMixdown => 7,
            Self::SplitAudio => 8,
            Self::Incomplete => 9,
            Self::NotStarted => 10,
            Self::Outdated => 11,
            Self::InputFileTransfer => 12,
            Self::Stopped => 13,
            Self::SpeechRecognition => 14,
        }
    }

    /// No further transitions happen after this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }

    /// Output files are available
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FileUpload => "File Upload",
            Self::Waiting => "Waiting",
            Self::Error => "Error",
            Self::Done => "Done",
            Self::AudioProcessing => "Audio Processing",
            Self::AudioEncoding => "Audio Encoding",
            Self::OutputFileTransfer => "Outgoing File Transfer",
            Self::MonoMixdown => "Mono Mixdown",
            Self::SplitAudio => "Split Audio On Chapter Marks",
            Self::Incomplete => "Incomplete",
            Self::NotStarted => "Production Not Started Yet",
            Self::Outdated => "Production Outdated",
            Self::InputFileTransfer => "Incoming File Transfer",
            Self::Stopped => "Stopping the Production",
            Self::SpeechRecognition => "Speech Recognition",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<i64> for Status {
    type Error = ClientError;

    fn try_from(code: i64) -> Result<Self, ClientError> {
        Self::from_code(code)
    }
}
