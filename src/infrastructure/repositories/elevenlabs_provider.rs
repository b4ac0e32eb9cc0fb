use super::synthesis_provider::{SynthesisError, SynthesisProvider};
use crate::domain::tts::{SynthesisKey, VoiceSettings};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const API_KEY_HEADER: &str = "xi-api-key";

/// ElevenLabs implementation of the synthesis boundary.
pub struct ElevenLabsProvider {
    http: reqwest::Client,
    base_url: String,
    model_id: String,
    language_code: Option<String>,
}

impl ElevenLabsProvider {
    pub fn new(
        base_url: String,
        model_id: String,
        language_code: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_id,
            language_code,
        })
    }

    fn synthesis_url(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, voice_id)
    }

    fn request_body(&self, text: &str, settings: &VoiceSettings) -> serde_json::Value {
        let mut body = json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": settings.stability,
                "similarity_boost": settings.similarity_boost,
            },
        });
        if let Some(language) = &self.language_code {
            body["language_code"] = json!(language);
        }
        body
    }
}

#[async_trait]
impl SynthesisProvider for ElevenLabsProvider {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        key: &SynthesisKey,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, SynthesisError> {
        let url = self.synthesis_url(voice_id);

        tracing::info!(
            key = %key.name,
            voice = voice_id,
            model = %self.model_id,
            text_length = text.len(),
            "Calling synthesis provider"
        );

        let started = std::time::Instant::now();

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &key.secret)
            .json(&self.request_body(text, settings))
            .send()
            .await
            .map_err(|e| SynthesisError {
                key_name: key.name.clone(),
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError {
                key_name: key.name.clone(),
                message: format!("provider returned {status}: {body}"),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError {
                key_name: key.name.clone(),
                message: format!("failed to read audio body: {e}"),
            })?
            .to_vec();

        tracing::info!(
            key = %key.name,
            latency_ms = started.elapsed().as_millis() as u64,
            audio_size_bytes = audio.len(),
            "Synthesis call completed"
        );

        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(language: Option<&str>) -> ElevenLabsProvider {
        ElevenLabsProvider::new(
            "https://api.elevenlabs.io/".to_string(),
            "eleven_multilingual_v2".to_string(),
            language.map(|s| s.to_string()),
            Duration::from_secs(30),
        )
        .unwrap()
    }

    #[test]
    fn test_synthesis_url_strips_trailing_slash() {
        let url = provider(None).synthesis_url("voice123");
        assert_eq!(url, "https://api.elevenlabs.io/v1/text-to-speech/voice123");
    }

    #[test]
    fn test_request_body_carries_settings() {
        let body = provider(None).request_body("hello", &VoiceSettings::default());
        assert_eq!(body["text"], "hello");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["voice_settings"]["stability"], 0.3);
        assert_eq!(body["voice_settings"]["similarity_boost"], 0.75);
        assert!(body.get("language_code").is_none());
    }

    #[test]
    fn test_request_body_includes_language_when_configured() {
        let body = provider(Some("en")).request_body("hello", &VoiceSettings::default());
        assert_eq!(body["language_code"], "en");
    }
}
