use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::transcription::domain::transcriber::Transcriber;
use crate::transcription::domain::transcript::{TextSegment, TranscriptionResult};
use crate::transcription::domain::transcription_error::TranscriptionError;

/// An input that was skipped, and why.
#[derive(Debug)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: TranscriptionError,
}

/// Successful results in input order, plus the inputs that were dropped.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<TranscriptionResult>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_results(self) -> Vec<TranscriptionResult> {
        self.results
    }
}

/// Transcribes a list of files strictly one after another.
///
/// A failing file is reported through the logger and skipped; it never
/// aborts the rest of the batch.
pub struct BatchTranscribeUseCase<'a> {
    transcriber: &'a dyn Transcriber,
    logger: Box<dyn PipelineLogger + 'a>,
}

impl<'a> BatchTranscribeUseCase<'a> {
    pub fn new(transcriber: &'a dyn Transcriber, logger: Box<dyn PipelineLogger + 'a>) -> Self {
        Self {
            transcriber,
            logger,
        }
    }

    pub fn run<P: AsRef<Path>>(&mut self, inputs: &[P]) -> BatchOutcome {
        let total = inputs.len();
        self.logger
            .info(&format!("Transcribing {total} file(s) sequentially"));
        inputs
            .iter()
            .enumerate()
            .fold(BatchOutcome::default(), |mut outcome, (i, input)| {
                let input: &Path = input.as_ref();
                self.logger
                    .progress(i + 1, total, &input.display().to_string());

                let start = Instant::now();
                let result = self.transcriber.transcribe(input);
                self.logger
                    .timing("transcribe", start.elapsed().as_secs_f64() * 1000.0);

                match result {
                    Ok(result) => {
                        self.logger.metric("segments", result.segments.len() as f64);
                        let speech: f64 = result.segments.iter().map(TextSegment::duration).sum();
                        self.logger.metric("speech_secs", speech);
                        outcome.results.push(result);
                    }
                    Err(error) => {
                        self.logger.warn(&format!(
                            "Transcription of {} failed: {error}",
                            input.display()
                        ));
                        outcome.failures.push(BatchFailure {
                            input: input.to_path_buf(),
                            error,
                        });
                    }
                }
                outcome
            })
    }

    pub fn summarize(&self) {
        self.logger.summary();
    }
}
