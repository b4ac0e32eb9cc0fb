use axum::{extract::Query, extract::State, http::StatusCode, Json};
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    domain::tts::{CreateJobRequest, CreateJobResponse, JobStatusResponse, SynthesisEvent},
    error::{AppError, AppResult},
    infrastructure::{repositories::JobStore, runtime::JobRuntime},
};

const MAX_TEXT_LENGTH: usize = 10_000;

/// Query for GET /api/tts/status
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

pub struct TtsController {
    runtime: Arc<JobRuntime>,
    job_store: Arc<dyn JobStore>,
    // Terminal records never change, so cached status responses stay valid.
    status_cache: Option<Cache<String, JobStatusResponse>>,
}

impl TtsController {
    pub fn new(
        runtime: Arc<JobRuntime>,
        job_store: Arc<dyn JobStore>,
        cache_enabled: bool,
    ) -> Self {
        let status_cache = cache_enabled.then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_idle(Duration::from_secs(10 * 60))
                .build()
        });

        Self {
            runtime,
            job_store,
            status_cache,
        }
    }

    /// POST /api/tts/jobs - Queue a synthesis job
    pub async fn create_job(
        State(controller): State<Arc<TtsController>>,
        Json(request): Json<CreateJobRequest>,
    ) -> AppResult<(StatusCode, Json<CreateJobResponse>)> {
        if request.text.trim().is_empty() {
            return Err(AppError::BadRequest("Text cannot be empty".to_string()));
        }
        if request.text.chars().count() > MAX_TEXT_LENGTH {
            return Err(AppError::PayloadTooLarge(
                "Text must be 10,000 characters or less".to_string(),
            ));
        }

        let job_id = Uuid::new_v4().to_string();

        tracing::info!(
            job_id = %job_id,
            title = %request.title,
            text_length = request.text.len(),
            "Queueing TTS job"
        );

        controller.runtime.enqueue(SynthesisEvent {
            job_id: job_id.clone(),
            text: request.text,
            title: request.title,
            user_id: request.user_id,
        })?;

        Ok((StatusCode::ACCEPTED, Json(CreateJobResponse { job_id })))
    }

    /// GET /api/tts/status?jobId=<id> - Poll a job's terminal state
    pub async fn get_status(
        State(controller): State<Arc<TtsController>>,
        Query(query): Query<StatusQuery>,
    ) -> AppResult<Json<JobStatusResponse>> {
        let job_id = query
            .job_id
            .ok_or_else(|| AppError::BadRequest("jobId query parameter is required".to_string()))?;

        if let Some(cache) = &controller.status_cache {
            if let Some(cached) = cache.get(&job_id).await {
                return Ok(Json(cached));
            }
        }

        let record = controller
            .job_store
            .find_by_job_id(&job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("no job with id {job_id}")))?;

        let response = JobStatusResponse::from(record);

        if let Some(cache) = &controller.status_cache {
            cache.insert(job_id, response.clone()).await;
        }

        Ok(Json(response))
    }
}
