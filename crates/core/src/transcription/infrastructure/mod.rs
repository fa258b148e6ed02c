pub mod argument_builder;
pub mod process_supervisor;
pub mod result_reconciler;
pub mod whisper_cli_client;
