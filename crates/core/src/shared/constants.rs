use std::time::Duration;

/// Command used to launch the speech-to-text tool when none is configured.
pub const WHISPER_PROGRAM: &str = "whisper";

/// Flag passed to the tool to check that it is installed.
pub const WHISPER_PROBE_FLAG: &str = "--help";

pub const WHISPER_INSTALL_HINT: &str =
    "pip install -U openai-whisper\n  # or\n  pip3 install -U openai-whisper";

/// Prefix of the per-invocation scratch directory.
pub const OUTPUT_DIR_PREFIX: &str = "whisper_output_";

/// How often the supervisor checks the child for exit, deadline and cancellation.
pub const PROCESS_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Max wait for the output pipes to drain once the child has exited.
/// Grandchildren that inherited the pipes can keep them open indefinitely.
pub const PIPE_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub const CONFIG_DIR_NAME: &str = "whisperwrap";
pub const CONFIG_FILE_NAME: &str = "config.json";
