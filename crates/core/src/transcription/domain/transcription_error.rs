use std::path::PathBuf;

use thiserror::Error;

use super::transcription_config::ConfigError;
use crate::shared::constants::WHISPER_INSTALL_HINT;

#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// The tool could not be launched at client construction.
    #[error("whisper is not installed: {message}\n\nInstall it with:\n  {hint}", hint = WHISPER_INSTALL_HINT)]
    NotInstalled { message: String },
    #[error("invalid audio file: {}, reason: {reason}", .path.display())]
    InvalidAudioFile { path: PathBuf, reason: String },
    /// Deadline elapsed or the caller cancelled. Carries the configured timeout.
    #[error("transcription timed out after {duration}")]
    Timeout { duration: String },
    #[error("transcription failed: {}, error: {source}: {stderr}", .path.display())]
    TranscriptionFailed {
        path: PathBuf,
        stderr: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("failed to create output directory: {0}")]
    OutputDir(#[source] std::io::Error),
}
