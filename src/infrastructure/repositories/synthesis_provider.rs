use crate::domain::tts::{SynthesisKey, VoiceSettings};
use async_trait::async_trait;

/// One failed synthesis attempt, attributable to the key that made it.
#[derive(Debug, Clone)]
pub struct SynthesisError {
    pub key_name: String,
    pub message: String,
}

impl std::fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key '{}': {}", self.key_name, self.message)
    }
}

impl std::error::Error for SynthesisError {}

/// Outbound boundary to the voice-synthesis provider.
///
/// Implementations make exactly one call per invocation and never retry;
/// rotation and retries belong to the orchestrator. They also never touch
/// the key or job stores.
#[async_trait]
pub trait SynthesisProvider: Send + Sync {
    /// Synthesize `text` with the given voice and key.
    ///
    /// Returns raw audio bytes (MP3) on success, or a `SynthesisError`
    /// carrying the offending key's name and the provider's message.
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        key: &SynthesisKey,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, SynthesisError>;
}
