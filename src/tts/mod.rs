//! ElevenLabs text-to-speech client.

use crate::config::ElevenLabsConfig;
use crate::errors::AppError;

const TTS_BASE_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

pub struct ElevenLabsClient {
    client: reqwest::Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Synthesize `text` with the given voice, returning raw audio bytes
    /// (audio/mpeg).
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/{}", TTS_BASE_URL, voice_id);

        let payload = serde_json::json!({
            "text": text,
            "model_id": self.config.model_id,
        });

        let res = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::TtsProvider(format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::TtsProvider(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let bytes = res
            .bytes()
            .await
            .map_err(|e| AppError::TtsProvider(format!("body read failed: {}", e)))?;

        Ok(bytes.to_vec())
    }
}
