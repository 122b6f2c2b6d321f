use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ProviderError, ScriptGenerator, SpeechSynthesizer};
use crate::audio::AudioClip;

const PROVIDER: &str = "openai";
const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Script generation via the chat completions API.
pub struct OpenAiScript {
    client: Client,
    api_key: String,
}

impl OpenAiScript {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl ScriptGenerator for OpenAiScript {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str, max_chars: u32) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(CHAT_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": "gpt-4o",
                "messages": [
                    { "role": "system", "content": "You are an expert meditation guide." },
                    { "role": "user", "content": prompt },
                ],
                "max_tokens": max_chars,
                "temperature": 0.5,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                PROVIDER,
                format!("chat completions returned {}: {}", status, body),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new(PROVIDER, "response contained no choices"))?;
        debug!("received {} chars of script", choice.message.content.len());
        Ok(choice.message.content)
    }
}

/// Speech synthesis via `/v1/audio/speech`, requesting WAV so the clip can
/// be decoded without an external codec.
pub struct OpenAiSpeech {
    client: Client,
    api_key: String,
    voice: String,
}

impl OpenAiSpeech {
    pub fn new(api_key: String, voice: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            voice: voice.to_string(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError> {
        let response = self
            .client
            .post(SPEECH_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": "tts-1",
                "input": text,
                "voice": self.voice,
                "response_format": "wav",
            }))
            .send()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                PROVIDER,
                format!("speech endpoint returned {}: {}", status, body),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;
        AudioClip::from_wav_bytes(&bytes)
            .map_err(|e| ProviderError::new(PROVIDER, format!("bad WAV payload: {}", e)))
    }
}
