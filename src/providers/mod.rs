//! External capability boundary: script generation and speech synthesis.
//!
//! The pipeline only sees the two traits here; each provider implements the
//! same narrow contract and is selected once at orchestration entry.

pub mod anthropic;
pub mod elevenlabs;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::AudioClip;
use crate::config::Config;
use crate::error::PipelineError;
use crate::request::{ScriptProvider, SpeechProvider};

/// Failure inside one provider call. The orchestrator and assembler wrap
/// this into the stage-specific pipeline error.
#[derive(Debug, Error)]
#[error("{provider}: {detail}")]
pub struct ProviderError {
    pub provider: &'static str,
    pub detail: String,
}

impl ProviderError {
    pub fn new(provider: &'static str, detail: impl Into<String>) -> Self {
        Self {
            provider,
            detail: detail.into(),
        }
    }
}

#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the raw meditation script. `max_chars` is the character
    /// budget resolved from the heuristics table.
    async fn generate(&self, prompt: &str, max_chars: u32) -> Result<String, ProviderError>;
}

impl std::fmt::Debug for dyn ScriptGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptGenerator")
            .field("name", &self.name())
            .finish()
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Synthesizes one segment and decodes the provider's wire format into
    /// an [`AudioClip`].
    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError>;
}

impl std::fmt::Debug for dyn SpeechSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechSynthesizer")
            .field("name", &self.name())
            .finish()
    }
}

pub fn script_generator(
    choice: ScriptProvider,
    config: &Config,
) -> Result<Box<dyn ScriptGenerator>, PipelineError> {
    match choice {
        ScriptProvider::OpenAi => {
            let key = require_key(&config.openai_api_key, "OPENAI_API_KEY")?;
            Ok(Box::new(openai::OpenAiScript::new(key)))
        }
        ScriptProvider::Anthropic => {
            let key = require_key(&config.anthropic_api_key, "ANTHROPIC_API_KEY")?;
            Ok(Box::new(anthropic::AnthropicScript::new(key)))
        }
    }
}

pub fn speech_synthesizer(
    choice: SpeechProvider,
    voice: &str,
    config: &Config,
) -> Result<Box<dyn SpeechSynthesizer>, PipelineError> {
    match choice {
        SpeechProvider::OpenAi => {
            let key = require_key(&config.openai_api_key, "OPENAI_API_KEY")?;
            Ok(Box::new(openai::OpenAiSpeech::new(key, voice)))
        }
        SpeechProvider::ElevenLabs => {
            let key = require_key(&config.elevenlabs_api_key, "ELEVENLABS_API_KEY")?;
            Ok(Box::new(elevenlabs::ElevenLabsSpeech::new(key, voice)))
        }
    }
}

fn require_key(key: &Option<String>, name: &str) -> Result<String, PipelineError> {
    key.clone()
        .ok_or_else(|| PipelineError::Configuration(format!("{} is not set", name)))
}
