use std::path::Path;

use super::cancellation::CancellationToken;
use super::transcript::TranscriptionResult;
use super::transcription_error::TranscriptionError;

/// Domain interface for turning one audio file into a transcription.
pub trait Transcriber {
    fn transcribe_with_cancellation(
        &self,
        audio_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<TranscriptionResult, TranscriptionError>;

    fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult, TranscriptionError> {
        self.transcribe_with_cancellation(audio_path, &CancellationToken::new())
    }
}
