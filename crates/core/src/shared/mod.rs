pub mod constants;
pub mod duration_format;
