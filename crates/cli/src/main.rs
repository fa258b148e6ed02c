use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use whisperwrap_core::pipeline::batch_transcribe_use_case::BatchTranscribeUseCase;
use whisperwrap_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use whisperwrap_core::shared::constants::WHISPER_PROGRAM;
use whisperwrap_core::transcription::domain::model_tier::ModelTier;
use whisperwrap_core::transcription::domain::output_format::OutputFormat;
use whisperwrap_core::transcription::domain::transcript::TranscriptionResult;
use whisperwrap_core::transcription::domain::transcription_config::{Preset, TranscriptionConfig};
use whisperwrap_core::transcription::infrastructure::process_supervisor::ToolCommand;
use whisperwrap_core::transcription::infrastructure::whisper_cli_client::WhisperCliClient;

/// Transcribe audio files with the whisper command-line tool.
#[derive(Parser)]
#[command(name = "whisperwrap")]
struct Cli {
    /// Audio files to transcribe. More than one runs a batch that skips failures.
    #[arg(required_unless_present = "list_models")]
    inputs: Vec<PathBuf>,

    /// Starting configuration: default, fast or accurate. A config file is
    /// applied on top of it.
    #[arg(long)]
    preset: Option<Preset>,

    /// JSON config file. Defaults to the user config file when it exists.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model tier: tiny, base, small, medium or large.
    #[arg(long)]
    model: Option<String>,

    /// Language code (e.g. en, zh), or "auto" to detect.
    #[arg(long)]
    language: Option<String>,

    /// Output format requested from whisper: txt, srt, vtt, json or all.
    #[arg(long)]
    output_format: Option<String>,

    /// Compute device passed to whisper (cpu, cuda).
    #[arg(long)]
    device: Option<String>,

    /// CPU threads (0 = whisper's default).
    #[arg(long)]
    threads: Option<u32>,

    /// Per-file timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<f64>,

    /// Beam search width (0 = whisper's default).
    #[arg(long)]
    beam_size: Option<u32>,

    /// Candidates when sampling (0 = whisper's default).
    #[arg(long)]
    best_of: Option<u32>,

    /// Sampling temperature (0.0-1.0). 0 keeps whisper's default.
    #[arg(long)]
    temperature: Option<f64>,

    /// Stream whisper's progress output to the log.
    #[arg(long)]
    verbose: bool,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// List model tiers and exit.
    #[arg(long)]
    list_models: bool,

    /// Program used to run whisper.
    #[arg(long, default_value = WHISPER_PROGRAM)]
    program: String,

    /// Extra argument placed before the file path (repeatable), e.g.
    /// `--program python3 --program-arg=-m --program-arg whisper`.
    #[arg(long = "program-arg", allow_hyphen_values = true)]
    program_args: Vec<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list_models {
        print_models();
        return Ok(());
    }

    let config = build_config(&cli, user_config_path())?;
    let command = cli
        .program_args
        .iter()
        .fold(ToolCommand::new(&cli.program), |cmd, arg| {
            cmd.with_leading_arg(arg)
        });
    let client = WhisperCliClient::with_command(config, command)?;

    if let [input] = cli.inputs.as_slice() {
        let result = client.transcribe(input)?;
        print_results(std::slice::from_ref(&result), cli.json)?;
        return Ok(());
    }

    let mut use_case =
        BatchTranscribeUseCase::new(&client, Box::new(StdoutPipelineLogger::new()));
    let outcome = use_case.run(&cli.inputs);
    use_case.summarize();

    if outcome.results.is_empty() && !outcome.failures.is_empty() {
        return Err(format!("all {} inputs failed", outcome.failures.len()).into());
    }
    print_results(&outcome.results, cli.json)?;
    Ok(())
}

/// Preset, then the config file (`--config`, else `user_config`), then flags.
fn build_config(
    cli: &Cli,
    user_config: Option<PathBuf>,
) -> Result<TranscriptionConfig, Box<dyn std::error::Error>> {
    let base = TranscriptionConfig::from_preset(cli.preset.unwrap_or_default());
    let mut config = match cli.config.clone().or(user_config) {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            TranscriptionConfig::load_over(&path, &base)?
        }
        None => base,
    };

    if let Some(model) = &cli.model {
        config.model = model.parse::<ModelTier>()?;
    }
    if let Some(language) = &cli.language {
        config.language = if language.eq_ignore_ascii_case("auto") {
            String::new()
        } else {
            language.clone()
        };
    }
    if let Some(format) = &cli.output_format {
        config.output_format = format.parse::<OutputFormat>()?;
    }
    if let Some(device) = &cli.device {
        config.device = device.clone();
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = Duration::try_from_secs_f64(secs)
            .map_err(|_| format!("Timeout must be a non-negative number of seconds, got {secs}"))?;
    }
    if let Some(beam_size) = cli.beam_size {
        config.beam_size = beam_size;
    }
    if let Some(best_of) = cli.best_of {
        config.best_of = best_of;
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if cli.verbose {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

/// The user config file, only if it exists.
fn user_config_path() -> Option<PathBuf> {
    TranscriptionConfig::default_path().filter(|p| p.exists())
}

fn print_results(
    results: &[TranscriptionResult],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    for result in results {
        if result.segments.is_empty() {
            println!("{}", result.text.trim_end());
        } else {
            for segment in &result.segments {
                println!(
                    "[{:8.2} - {:8.2}] {}",
                    segment.start, segment.end, segment.text
                );
            }
        }
    }
    Ok(())
}

fn print_models() {
    println!(
        "{:8} {:>8}  {:10} {:9} recommended for",
        "model", "size", "speed", "accuracy"
    );
    for tier in ModelTier::ALL {
        let info = tier.info();
        println!(
            "{:8} {:>8}  {:10} {:9} {}",
            info.name, info.size, info.speed, info.accuracy, info.recommended
        );
    }
}
