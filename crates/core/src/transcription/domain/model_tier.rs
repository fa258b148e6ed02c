use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whisper model size. Larger tiers are slower and more accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

/// Static description of a model tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: &'static str,
    pub size: &'static str,
    pub speed: &'static str,
    pub accuracy: &'static str,
    pub recommended: &'static str,
}

static MODEL_INFO: [ModelInfo; 5] = [
    ModelInfo {
        name: "tiny",
        size: "75 MB",
        speed: "very fast",
        accuracy: "low",
        recommended: "short clips, quick previews",
    },
    ModelInfo {
        name: "base",
        size: "142 MB",
        speed: "fast",
        accuracy: "fair",
        recommended: "everyday use, quick transcription",
    },
    ModelInfo {
        name: "small",
        size: "466 MB",
        speed: "moderate",
        accuracy: "good",
        recommended: "balance of speed and accuracy",
    },
    ModelInfo {
        name: "medium",
        size: "1.5 GB",
        speed: "slow",
        accuracy: "high",
        recommended: "long recordings, meeting notes (recommended)",
    },
    ModelInfo {
        name: "large",
        size: "3 GB",
        speed: "slowest",
        accuracy: "highest",
        recommended: "professional transcription, demanding scenarios",
    },
];

impl ModelTier {
    pub const ALL: &'static [ModelTier] = &[
        ModelTier::Tiny,
        ModelTier::Base,
        ModelTier::Small,
        ModelTier::Medium,
        ModelTier::Large,
    ];

    /// Name understood by the `--model` flag.
    pub fn as_str(self) -> &'static str {
        self.info().name
    }

    pub fn info(self) -> &'static ModelInfo {
        &MODEL_INFO[self as usize]
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model tier '{0}' (expected tiny, base, small, medium or large)")]
pub struct UnknownModelTier(pub String);

impl FromStr for ModelTier {
    type Err = UnknownModelTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ModelTier::ALL
            .iter()
            .copied()
            .find(|tier| tier.as_str() == lower)
            .ok_or_else(|| UnknownModelTier(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_info_table_matches_tier_order() {
        for tier in ModelTier::ALL {
            assert_eq!(tier.info().name, tier.as_str());
        }
        assert_eq!(ModelTier::Medium.info().size, "1.5 GB");
    }

    #[test]
    fn test_tiers_are_ordered_by_size() {
        assert!(ModelTier::Tiny < ModelTier::Base);
        assert!(ModelTier::Medium < ModelTier::Large);
    }

    #[rstest]
    #[case("tiny", ModelTier::Tiny)]
    #[case("BASE", ModelTier::Base)]
    #[case(" large ", ModelTier::Large)]
    fn test_parse(#[case] input: &str, #[case] expected: ModelTier) {
        assert_eq!(input.parse::<ModelTier>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_tier() {
        let err = "huge".parse::<ModelTier>().unwrap_err();
        assert!(err.to_string().contains("huge"));
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&ModelTier::Small).unwrap();
        assert_eq!(json, "\"small\"");
        let tier: ModelTier = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(tier, ModelTier::Medium);
    }
}
