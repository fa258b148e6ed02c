pub mod cancellation;
pub mod model_tier;
pub mod output_format;
pub mod transcriber;
pub mod transcript;
pub mod transcription_config;
pub mod transcription_error;
