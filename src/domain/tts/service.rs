use super::error::TtsJobError;
use super::key_pool::KeyPool;
use super::model::{JobStatus, NewJobRecord};
use super::settings::VoiceSettings;
use super::SynthesisEvent;
use crate::infrastructure::repositories::{AssetStore, JobStore, KeyStore, SynthesisProvider};
use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// Outcome of one full orchestrator run that reached a terminal record.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Success {
        audio_url: String,
        key_name: String,
        characters_used: i32,
    },
    Failed {
        error: String,
    },
}

/// Entry point the job runtime drives. One call runs the whole state
/// machine: key-select -> synthesize (rotating on failure) -> publish ->
/// record.
#[async_trait]
pub trait TtsJobApi: Send + Sync {
    /// Run a synthesis job to a terminal state.
    ///
    /// Returns `Ok` once a terminal job record exists, whether the job
    /// succeeded or failed. Returns `Err` only when the terminal record
    /// could not be written; the runtime may then re-run the whole job.
    async fn run(&self, event: &SynthesisEvent) -> Result<JobOutcome, TtsJobError>;
}

pub struct TtsJobService {
    keys: Arc<dyn KeyStore>,
    provider: Arc<dyn SynthesisProvider>,
    assets: Arc<dyn AssetStore>,
    jobs: Arc<dyn JobStore>,
    voice_id: String,
    audio_folder: String,
    settings: VoiceSettings,
}

impl TtsJobService {
    pub fn new(
        keys: Arc<dyn KeyStore>,
        provider: Arc<dyn SynthesisProvider>,
        assets: Arc<dyn AssetStore>,
        jobs: Arc<dyn JobStore>,
        voice_id: String,
        audio_folder: String,
        settings: VoiceSettings,
    ) -> Self {
        Self {
            keys,
            provider,
            assets,
            jobs,
            voice_id,
            audio_folder,
            settings,
        }
    }
}

#[async_trait]
impl TtsJobApi for TtsJobService {
    async fn run(&self, event: &SynthesisEvent) -> Result<JobOutcome, TtsJobError> {
        let started = Instant::now();

        tracing::info!(
            job_id = %event.job_id,
            title = %event.title,
            text_length = event.text.len(),
            "TTS job started"
        );

        let text = normalize_whitespace(&event.text);
        if text.is_empty() {
            return self
                .record_failure(event, &text, started, 0, None, "input text is empty".to_string())
                .await;
        }
        let char_count = text.chars().count() as i32;

        // Key rotation loop: each key is tried at most once per run.
        let mut pool = KeyPool::new(self.keys.clone());
        let (audio, key_name) = loop {
            let key = match pool
                .select_key()
                .await
                .map_err(|e| TtsJobError::Store(e.to_string()))?
            {
                Some(key) => key,
                None => {
                    let error = TtsJobError::ExhaustedKeyPool.to_string();
                    tracing::warn!(
                        job_id = %event.job_id,
                        keys_tried = pool.tried_count(),
                        "No usable synthesis key left"
                    );
                    return self
                        .record_failure(event, &text, started, 0, None, error)
                        .await;
                }
            };

            match self
                .provider
                .synthesize(&text, &self.voice_id, &key, &self.settings)
                .await
            {
                Ok(bytes) => {
                    pool.record_usage(&key.name, char_count).await;
                    break (bytes, key.name);
                }
                Err(err) => {
                    tracing::warn!(
                        job_id = %event.job_id,
                        key = %err.key_name,
                        error = %err.message,
                        "Synthesis attempt failed, rotating to next key"
                    );
                    pool.mark_unavailable(&key.name, &err.message).await;
                }
            }
        };

        tracing::info!(
            job_id = %event.job_id,
            key = %key_name,
            audio_size = audio.len(),
            characters = char_count,
            "Synthesis succeeded, publishing audio"
        );

        // Publish failure is terminal: the key already delivered, so there
        // is nothing to gain from rotating further.
        match self.assets.publish(&audio, &self.audio_folder, &event.job_id).await {
            Ok(audio_url) => {
                let record = NewJobRecord {
                    job_id: event.job_id.clone(),
                    input_text: text,
                    voice_id: self.voice_id.clone(),
                    audio_url: Some(audio_url.clone()),
                    key_name: Some(key_name.clone()),
                    characters_used: char_count,
                    duration_ms: started.elapsed().as_millis() as i64,
                    status: JobStatus::Success,
                    error: None,
                    user_id: event.user_id.clone(),
                };
                self.jobs
                    .insert(&record)
                    .await
                    .map_err(|e| TtsJobError::Store(e.to_string()))?;

                tracing::info!(
                    job_id = %event.job_id,
                    audio_url = %audio_url,
                    key = %key_name,
                    duration_ms = record.duration_ms,
                    "TTS job completed"
                );

                Ok(JobOutcome::Success {
                    audio_url,
                    key_name,
                    characters_used: char_count,
                })
            }
            Err(err) => {
                let error = TtsJobError::Publish(err.to_string()).to_string();
                self.record_failure(event, &text, started, char_count, Some(key_name), error)
                    .await
            }
        }
    }
}

impl TtsJobService {
    async fn record_failure(
        &self,
        event: &SynthesisEvent,
        input_text: &str,
        started: Instant,
        characters_used: i32,
        key_name: Option<String>,
        error: String,
    ) -> Result<JobOutcome, TtsJobError> {
        let record = NewJobRecord {
            job_id: event.job_id.clone(),
            input_text: input_text.to_string(),
            voice_id: self.voice_id.clone(),
            audio_url: None,
            key_name,
            characters_used,
            duration_ms: started.elapsed().as_millis() as i64,
            status: JobStatus::Failed,
            error: Some(error.clone()),
            user_id: event.user_id.clone(),
        };
        self.jobs
            .insert(&record)
            .await
            .map_err(|e| TtsJobError::Store(e.to_string()))?;

        tracing::warn!(job_id = %event.job_id, error = %error, "TTS job failed");

        Ok(JobOutcome::Failed { error })
    }
}

/// Collapse whitespace runs and trim so character accounting is stable
/// regardless of how the source text was formatted.
fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    let pattern =
        WHITESPACE_PATTERN.get_or_init(|| regex::Regex::new(r"\s+").expect("static pattern"));
    pattern.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        let input = "Too    many     spaces\n\nand\n\nnewlines";
        assert_eq!(normalize_whitespace(input), "Too many spaces and newlines");
    }

    #[test]
    fn test_normalize_whitespace_keeps_plain_text() {
        assert_eq!(normalize_whitespace("Hello world"), "Hello world");
    }

    #[test]
    fn test_normalize_whitespace_trims() {
        assert_eq!(normalize_whitespace("  padded  "), "padded");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }
}
