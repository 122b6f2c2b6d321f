use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{ProviderError, SpeechSynthesizer};
use crate::audio::AudioClip;

const PROVIDER: &str = "elevenlabs";
// Raw PCM output keeps decoding local; the rate must match the format name.
const PCM_SAMPLE_RATE: u32 = 22050;
const OUTPUT_FORMAT: &str = "pcm_22050";

/// Speech synthesis via the ElevenLabs text-to-speech API.
pub struct ElevenLabsSpeech {
    client: Client,
    api_key: String,
    voice_id: String,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: String, voice_id: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            voice_id: voice_id.to_string(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError> {
        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}?output_format={}",
            self.voice_id, OUTPUT_FORMAT
        );
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&json!({
                "text": text,
                "model_id": "eleven_monolingual_v1",
            }))
            .send()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                PROVIDER,
                format!("text-to-speech returned {}: {}", status, body),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;
        Ok(AudioClip::from_pcm_s16le(&bytes, PCM_SAMPLE_RATE))
    }
}
