use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{ProviderError, ScriptGenerator};

const PROVIDER: &str = "anthropic";
const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Script generation via the Anthropic messages API.
pub struct AnthropicScript {
    client: Client,
    api_key: String,
}

impl AnthropicScript {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

#[async_trait]
impl ScriptGenerator for AnthropicScript {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, prompt: &str, _max_chars: u32) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&json!({
                "model": "claude-3-haiku-20240307",
                "system": "You are an expert meditation guide.",
                "max_tokens": 4000,
                "temperature": 0.3,
                "messages": [
                    { "role": "user", "content": prompt },
                ],
            }))
            .send()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                PROVIDER,
                format!("messages endpoint returned {}: {}", status, body),
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(PROVIDER, e.to_string()))?;
        let block = parsed
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new(PROVIDER, "response contained no content blocks"))?;
        debug!("received {} chars of script", block.text.len());
        Ok(block.text)
    }
}
