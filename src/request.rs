use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Requested session length, as exposed on the wire ("2-5min" etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum DurationTier {
    #[serde(rename = "2-5min")]
    #[value(name = "2-5min")]
    Short,
    #[serde(rename = "5-10min")]
    #[value(name = "5-10min")]
    Medium,
    #[serde(rename = "10+min")]
    #[value(name = "10+min")]
    Long,
}

impl DurationTier {
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "2-5min",
            Self::Medium => "5-10min",
            Self::Long => "10+min",
        }
    }

    /// Nominal session length in minutes, used for the heuristics key and
    /// the generation prompt.
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Short => 4,
            Self::Medium => 7,
            Self::Long => 10,
        }
    }
}

impl fmt::Display for DurationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationTier {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2-5min" => Ok(Self::Short),
            "5-10min" => Ok(Self::Medium),
            "10+min" => Ok(Self::Long),
            other => Err(PipelineError::Validation(format!(
                "unknown duration '{}', expected one of: 2-5min, 5-10min, 10+min",
                other
            ))),
        }
    }
}

/// Instructional density of the script, mapped to structural parameters by
/// the heuristics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceLevel {
    Low,
    Medium,
    High,
}

impl GuidanceLevel {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for GuidanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuidanceLevel {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(PipelineError::Validation(format!(
                "unknown guidance level '{}', expected one of: low, medium, high",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptProvider {
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "anthropic")]
    Anthropic,
}

impl ScriptProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ScriptProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptProvider {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(PipelineError::Validation(format!(
                "unknown AI provider '{}', expected one of: openai, anthropic",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpeechProvider {
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "elevenlabs")]
    ElevenLabs,
}

impl SpeechProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::ElevenLabs => "elevenlabs",
        }
    }
}

impl fmt::Display for SpeechProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpeechProvider {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAi),
            "elevenlabs" => Ok(Self::ElevenLabs),
            other => Err(PipelineError::Validation(format!(
                "unknown TTS provider '{}', expected one of: openai, elevenlabs",
                other
            ))),
        }
    }
}

/// One accepted generation request. Immutable for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub duration: DurationTier,
    pub guidance: GuidanceLevel,
    pub script_provider: ScriptProvider,
    pub speech_provider: SpeechProvider,
    pub voice: String,
    pub focus: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_tiers_parse_from_wire_names() {
        assert_eq!("2-5min".parse::<DurationTier>().unwrap(), DurationTier::Short);
        assert_eq!("5-10min".parse::<DurationTier>().unwrap(), DurationTier::Medium);
        assert_eq!("10+min".parse::<DurationTier>().unwrap(), DurationTier::Long);
    }

    #[test]
    fn duration_tier_minutes_mapping() {
        assert_eq!(DurationTier::Short.minutes(), 4);
        assert_eq!(DurationTier::Medium.minutes(), 7);
        assert_eq!(DurationTier::Long.minutes(), 10);
    }

    #[test]
    fn unknown_guidance_level_is_a_validation_error() {
        let err = "ultra".parse::<GuidanceLevel>().unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(err.to_string().contains("ultra"));
    }

    #[test]
    fn unknown_providers_are_validation_errors() {
        assert!(matches!(
            "gemini".parse::<ScriptProvider>(),
            Err(PipelineError::Validation(_))
        ));
        assert!(matches!(
            "espeak".parse::<SpeechProvider>(),
            Err(PipelineError::Validation(_))
        ));
    }
}
