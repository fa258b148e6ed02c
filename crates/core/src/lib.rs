//! Run the `whisper` speech-to-text CLI as a supervised subprocess and turn
//! its output files into [`TranscriptionResult`] values.
//!
//! ```no_run
//! use std::path::Path;
//! use whisperwrap_core::{TranscriptionConfig, WhisperCliClient};
//!
//! let client = WhisperCliClient::new(TranscriptionConfig::fast())?;
//! let result = client.transcribe(Path::new("meeting.mp3"))?;
//! println!("{}", result.text);
//! # Ok::<(), whisperwrap_core::TranscriptionError>(())
//! ```

pub mod pipeline;
pub mod shared;
pub mod transcription;

pub use pipeline::batch_transcribe_use_case::{BatchFailure, BatchOutcome, BatchTranscribeUseCase};
pub use transcription::domain::cancellation::CancellationToken;
pub use transcription::domain::model_tier::{ModelInfo, ModelTier};
pub use transcription::domain::output_format::OutputFormat;
pub use transcription::domain::transcriber::Transcriber;
pub use transcription::domain::transcript::{TextSegment, TranscriptionResult};
pub use transcription::domain::transcription_config::{ConfigError, Preset, TranscriptionConfig};
pub use transcription::domain::transcription_error::TranscriptionError;
pub use transcription::infrastructure::process_supervisor::ToolCommand;
pub use transcription::infrastructure::whisper_cli_client::WhisperCliClient;
