use crate::error::AppError;

/// Failure taxonomy of the synthesis pipeline.
///
/// `KeyUnavailable` is recovered locally by rotating to the next key;
/// everything else is terminal for the job. `Store` is the one variant that
/// escapes the orchestrator, signalling the runtime that the attempt never
/// reached a terminal record and may be re-run.
#[derive(Debug, thiserror::Error)]
pub enum TtsJobError {
    #[error("key '{key_name}' unavailable: {message}")]
    KeyUnavailable { key_name: String, message: String },

    #[error("ExhaustedKeyPool: every enabled key was tried and failed")]
    ExhaustedKeyPool,

    #[error("publish failed: {0}")]
    Publish(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("job store error: {0}")]
    Store(String),
}

impl From<TtsJobError> for AppError {
    fn from(err: TtsJobError) -> Self {
        match err {
            TtsJobError::Invalid(msg) => AppError::BadRequest(msg),
            TtsJobError::Store(msg) => AppError::Internal(msg),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}
