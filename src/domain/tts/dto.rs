use crate::domain::tts::model::{JobStatus, TtsJobRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit of work entering the pipeline. Transient; it only survives as the
/// terminal job record it produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisEvent {
    pub job_id: String,
    pub text: String,
    pub title: String,
    pub user_id: Option<String>,
}

/// Request for POST /api/tts/jobs
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub text: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub job_id: String,
}

/// Response for GET /api/tts/status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub characters_used: i32,
}

impl From<TtsJobRecord> for JobStatusResponse {
    fn from(record: TtsJobRecord) -> Self {
        Self {
            job_id: record.job_id,
            status: record.status,
            audio_url: record.audio_url,
            error: record.error,
            created_at: record.created_at,
            completed_at: record.completed_at,
            characters_used: record.characters_used,
        }
    }
}
