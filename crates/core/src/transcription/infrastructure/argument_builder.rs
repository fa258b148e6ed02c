use std::ffi::OsString;
use std::path::Path;

use crate::transcription::domain::transcription_config::TranscriptionConfig;

/// Build the whisper command-line arguments for one input file.
///
/// The input path always comes first, followed by option flags each
/// immediately followed by its value. Unset options (empty strings, zero
/// counts, zero temperature) are omitted so the tool's defaults apply.
/// `--output_dir` is not included; the caller appends it.
pub fn build_args(config: &TranscriptionConfig, audio_path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![audio_path.as_os_str().to_os_string()];
    let mut push = |flag: &str, value: String| {
        args.push(flag.into());
        args.push(value.into());
    };

    push("--model", config.model.to_string());

    if !config.language.is_empty() {
        push("--language", config.language.clone());
    }

    push("--output_format", config.output_format.to_string());

    if !config.device.is_empty() {
        push("--device", config.device.clone());
    }
    if config.threads > 0 {
        push("--threads", config.threads.to_string());
    }
    if config.beam_size > 0 {
        push("--beam_size", config.beam_size.to_string());
    }
    if config.best_of > 0 {
        push("--best_of", config.best_of.to_string());
    }
    if config.temperature > 0.0 {
        push("--temperature", format!("{:.2}", config.temperature));
    }
    if config.verbose {
        push("--verbose", "True".to_string());
    }

    args
}
