pub mod batch_transcribe_use_case;
pub mod pipeline_logger;
