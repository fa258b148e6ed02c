use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::model_tier::ModelTier;
use super::output_format::OutputFormat;
use crate::shared::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("temperature must be between 0.0 and 1.0, got {0}")]
    TemperatureOutOfRange(f64),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Options forwarded to the whisper command for every invocation.
///
/// Built once per client and never mutated afterwards. Numeric options use
/// `0` for "unset": the flag is omitted and the tool's own default applies.
/// That includes `temperature`, so greedy decoding (0.0) is never passed
/// explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: ModelTier,
    /// Language code such as `en` or `zh`. Empty means auto-detect.
    pub language: String,
    pub output_format: OutputFormat,
    pub verbose: bool,
    /// `cpu`, `cuda`, ... Empty leaves device selection to the tool.
    pub device: String,
    pub threads: u32,
    #[serde(rename = "timeout_secs", with = "duration_secs")]
    pub timeout: Duration,
    pub beam_size: u32,
    pub best_of: u32,
    pub temperature: f64,
    /// Long-audio segmentation hints. Not forwarded to the tool.
    pub enable_vad: bool,
    pub max_segment_len: u32,
    pub split_on_silence: bool,
}

impl Default for TranscriptionConfig {
    /// Tuned for long recordings.
    fn default() -> Self {
        Self {
            model: ModelTier::Medium,
            language: "zh".to_string(),
            output_format: OutputFormat::Text,
            verbose: false,
            device: "cpu".to_string(),
            threads: 0,
            timeout: Duration::from_secs(30 * 60),
            beam_size: 5,
            best_of: 5,
            temperature: 0.0,
            enable_vad: true,
            max_segment_len: 300,
            split_on_silence: true,
        }
    }
}

impl TranscriptionConfig {
    /// Trades accuracy for speed.
    pub fn fast() -> Self {
        Self {
            model: ModelTier::Base,
            beam_size: 1,
            best_of: 1,
            max_segment_len: 180,
            ..Self::default()
        }
    }

    /// Trades speed for accuracy.
    pub fn accurate() -> Self {
        Self {
            model: ModelTier::Large,
            beam_size: 10,
            best_of: 10,
            max_segment_len: 600,
            timeout: Duration::from_secs(60 * 60),
            ..Self::default()
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self::default(),
            Preset::Fast => Self::fast(),
            Preset::Accurate => Self::accurate(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::TemperatureOutOfRange(self.temperature));
        }
        Ok(())
    }

    /// Load a JSON config file. Missing fields fall back to [`Default`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_over(path, &Self::default())
    }

    /// Load a JSON config file on top of `base`: fields present in the file
    /// replace those of `base`, the rest are kept.
    pub fn load_over(path: &Path, base: &Self) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parse_error = |source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        };

        let overrides: Value = serde_json::from_str(&json).map_err(parse_error)?;
        let merged = match (serde_json::to_value(base).map_err(parse_error)?, overrides) {
            (Value::Object(mut fields), Value::Object(overrides)) => {
                fields.extend(overrides);
                Value::Object(fields)
            }
            // Not an object: let deserialization report the type error.
            (_, other) => other,
        };
        let config: Self = serde_json::from_value(merged).map_err(parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/whisperwrap/config.json`, e.g. `~/.config/whisperwrap/config.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}

/// Named starting points for a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Default,
    Fast,
    Accurate,
}

impl Preset {
    pub const ALL: &'static [Preset] = &[Preset::Default, Preset::Fast, Preset::Accurate];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::Fast => "fast",
            Preset::Accurate => "accurate",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| format!("unknown preset '{s}' (expected default, fast or accurate)"))
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
