use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::argument_builder::build_args;
use super::process_supervisor::{join_args, ProcessError, ProcessSupervisor, ToolCommand};
use super::result_reconciler::reconcile;
use crate::pipeline::batch_transcribe_use_case::BatchTranscribeUseCase;
use crate::pipeline::pipeline_logger::StdoutPipelineLogger;
use crate::shared::constants::OUTPUT_DIR_PREFIX;
use crate::shared::duration_format::format_duration;
use crate::transcription::domain::cancellation::CancellationToken;
use crate::transcription::domain::transcriber::Transcriber;
use crate::transcription::domain::transcript::TranscriptionResult;
use crate::transcription::domain::transcription_config::TranscriptionConfig;
use crate::transcription::domain::transcription_error::TranscriptionError;

/// Transcribes audio files by running the whisper CLI.
///
/// Each call gets its own scratch directory for the tool's output. The
/// directory is removed when the call returns, whatever the outcome.
#[derive(Debug)]
pub struct WhisperCliClient {
    config: TranscriptionConfig,
    supervisor: ProcessSupervisor,
    scratch_root: Option<PathBuf>,
}

impl WhisperCliClient {
    /// Validate `config` and check that `whisper` can be launched.
    pub fn new(config: TranscriptionConfig) -> Result<Self, TranscriptionError> {
        Self::with_command(config, ToolCommand::default())
    }

    pub fn with_command(
        config: TranscriptionConfig,
        command: ToolCommand,
    ) -> Result<Self, TranscriptionError> {
        config.validate()?;

        let supervisor = ProcessSupervisor::new(command).with_echo(config.verbose);
        supervisor
            .probe()
            .map_err(|e| TranscriptionError::NotInstalled {
                message: format!("could not run `{} --help`: {e}", supervisor.command()),
            })?;

        Ok(Self {
            config,
            supervisor,
            scratch_root: None,
        })
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn config(&self) -> &TranscriptionConfig {
        &self.config
    }

    pub fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult, TranscriptionError> {
        self.transcribe_with_cancellation(audio_path, &CancellationToken::new())
    }

    /// Transcribe one file, giving up when either the configured timeout
    /// elapses or `cancel` fires. Both surface as [`TranscriptionError::Timeout`].
    pub fn transcribe_with_cancellation(
        &self,
        audio_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        check_audio_file(audio_path)?;
        if cancel.is_cancelled() {
            return Err(self.process_error(audio_path, ProcessError::TimedOut));
        }

        let output_dir = self.create_output_dir()?;
        let mut args = build_args(&self.config, audio_path);
        args.push(OsString::from("--output_dir"));
        args.push(output_dir.path().as_os_str().to_os_string());

        if self.config.verbose {
            log::info!(
                "[whisper] Running: {} {}",
                self.supervisor.command(),
                join_args(&args)
            );
        }

        let output = self
            .supervisor
            .run(&args, self.config.timeout, cancel)
            .map_err(|e| self.process_error(audio_path, e))?;

        if self.config.verbose {
            log::info!("[whisper] Finished in {:.1?}", output.elapsed);
        }

        let result = reconcile(audio_path, output_dir.path(), self.config.model);

        let dir_path = output_dir.path().to_path_buf();
        if let Err(e) = output_dir.close() {
            log::warn!("Failed to remove {}: {e}", dir_path.display());
        }

        Ok(result)
    }

    /// Transcribe `audio_paths` one after another, skipping (and logging)
    /// files that fail. Results keep the order of the successful inputs.
    pub fn transcribe_batch<P: AsRef<Path>>(&self, audio_paths: &[P]) -> Vec<TranscriptionResult> {
        let mut use_case = BatchTranscribeUseCase::new(self, Box::new(StdoutPipelineLogger::new()));
        let outcome = use_case.run(audio_paths);
        use_case.summarize();
        outcome.into_results()
    }

    fn create_output_dir(&self) -> Result<TempDir, TranscriptionError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(OUTPUT_DIR_PREFIX);
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(TranscriptionError::OutputDir)
    }

    fn process_error(&self, audio_path: &Path, error: ProcessError) -> TranscriptionError {
        match error {
            ProcessError::TimedOut => TranscriptionError::Timeout {
                duration: format_duration(self.config.timeout),
            },
            other => {
                let stderr = match &other {
                    ProcessError::Exited { stderr, .. } => stderr.trim().to_string(),
                    _ => String::new(),
                };
                TranscriptionError::TranscriptionFailed {
                    path: audio_path.to_path_buf(),
                    stderr,
                    source: Box::new(other),
                }
            }
        }
    }
}

impl Transcriber for WhisperCliClient {
    fn transcribe_with_cancellation(
        &self,
        audio_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        WhisperCliClient::transcribe_with_cancellation(self, audio_path, cancel)
    }
}

fn check_audio_file(audio_path: &Path) -> Result<(), TranscriptionError> {
    let invalid = |reason: &str| TranscriptionError::InvalidAudioFile {
        path: audio_path.to_path_buf(),
        reason: reason.to_string(),
    };
    match fs::metadata(audio_path) {
        Ok(meta) if meta.is_dir() => Err(invalid("path is a directory")),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(invalid("file does not exist")),
        // Anything else (e.g. permissions) is left for the tool to report.
        _ => Ok(()),
    }
}
