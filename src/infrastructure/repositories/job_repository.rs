use crate::domain::tts::{NewJobRecord, TtsJobRecord};
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Store contract for terminal job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Write a terminal record. Replays of an already-recorded job id must
    /// be no-ops so runtime re-invocations after a crash stay harmless.
    async fn insert(&self, record: &NewJobRecord) -> AppResult<()>;

    /// Look up a record by its external job identifier.
    async fn find_by_job_id(&self, job_id: &str) -> AppResult<Option<TtsJobRecord>>;
}

pub struct JobRepository {
    pool: Arc<DbPool>,
}

impl JobRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for JobRepository {
    async fn insert(&self, record: &NewJobRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tts_jobs
                (id, job_id, input_text, voice_id, audio_url, key_name, characters_used,
                 duration_ms, status, error, user_id, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            ON CONFLICT (job_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.job_id)
        .bind(&record.input_text)
        .bind(&record.voice_id)
        .bind(&record.audio_url)
        .bind(&record.key_name)
        .bind(record.characters_used)
        .bind(record.duration_ms)
        .bind(record.status)
        .bind(&record.error)
        .bind(&record.user_id)
        .bind(Utc::now())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn find_by_job_id(&self, job_id: &str) -> AppResult<Option<TtsJobRecord>> {
        let record = sqlx::query_as::<_, TtsJobRecord>(
            r#"
            SELECT id, job_id, input_text, voice_id, audio_url, key_name, characters_used,
                   duration_ms, status, error, user_id, created_at, completed_at
            FROM tts_jobs
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }
}
