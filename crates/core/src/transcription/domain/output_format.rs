use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Artifact format requested from the tool via `--output_format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "txt")]
    Text,
    #[serde(rename = "srt")]
    Srt,
    #[serde(rename = "vtt")]
    Vtt,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "all")]
    All,
}

impl OutputFormat {
    pub const ALL: &'static [OutputFormat] = &[
        OutputFormat::Text,
        OutputFormat::Srt,
        OutputFormat::Vtt,
        OutputFormat::Json,
        OutputFormat::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Json => "json",
            OutputFormat::All => "all",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format '{0}' (expected txt, srt, vtt, json or all)")]
pub struct UnknownOutputFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        OutputFormat::ALL
            .iter()
            .copied()
            .find(|format| format.as_str() == lower)
            .ok_or_else(|| UnknownOutputFormat(s.to_string()))
    }
}
