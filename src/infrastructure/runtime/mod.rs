use crate::domain::tts::{SynthesisEvent, TtsJobApi};
use crate::error::AppError;
use std::sync::Arc;
use tokio::sync::mpsc;

/// In-process job execution runtime.
///
/// Delivers each queued event to the orchestrator at least once and re-runs
/// the whole state machine on infrastructure faults, up to `max_attempts`.
/// A job that exhausts its attempts is abandoned: logged, no record written,
/// and status polling answers 404 for it.
pub struct JobRuntime {
    tx: mpsc::Sender<SynthesisEvent>,
}

impl JobRuntime {
    /// Spawn the worker loop and return a handle for enqueueing events.
    pub fn spawn(handler: Arc<dyn TtsJobApi>, max_attempts: u32, queue_size: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<SynthesisEvent>(queue_size);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                process(handler.as_ref(), &event, max_attempts).await;
            }
            tracing::info!("Job runtime queue closed, worker stopping");
        });

        Self { tx }
    }

    /// Queue an event for processing. Rejects when the queue is full rather
    /// than blocking the request path.
    pub fn enqueue(&self, event: SynthesisEvent) -> Result<(), AppError> {
        self.tx.try_send(event).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => {
                AppError::ServiceUnavailable("job queue is full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Internal("job runtime is not running".to_string())
            }
        })
    }
}

/// Run one event to a terminal record, retrying whole runs on faults.
async fn process(handler: &dyn TtsJobApi, event: &SynthesisEvent, max_attempts: u32) {
    for attempt in 1..=max_attempts {
        match handler.run(event).await {
            Ok(outcome) => {
                tracing::info!(
                    job_id = %event.job_id,
                    attempt = attempt,
                    outcome = ?outcome,
                    "Job reached terminal state"
                );
                return;
            }
            Err(err) => {
                tracing::warn!(
                    job_id = %event.job_id,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %err,
                    "Job attempt failed"
                );
            }
        }
    }

    tracing::error!(
        job_id = %event.job_id,
        max_attempts = max_attempts,
        "Job abandoned after exhausting runtime attempts"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tts::{JobOutcome, TtsJobError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyHandler {
        calls: AtomicU32,
        failures_before_success: u32,
    }

    #[async_trait]
    impl TtsJobApi for FlakyHandler {
        async fn run(&self, _event: &SynthesisEvent) -> Result<JobOutcome, TtsJobError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(TtsJobError::Store("connection reset".to_string()))
            } else {
                Ok(JobOutcome::Failed {
                    error: "terminal".to_string(),
                })
            }
        }
    }

    fn event() -> SynthesisEvent {
        SynthesisEvent {
            job_id: "job-1".to_string(),
            text: "hello".to_string(),
            title: "t".to_string(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_process_stops_at_first_terminal_outcome() {
        let handler = FlakyHandler {
            calls: AtomicU32::new(0),
            failures_before_success: 0,
        };
        process(&handler, &event(), 3).await;
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_process_retries_faults_until_terminal() {
        let handler = FlakyHandler {
            calls: AtomicU32::new(0),
            failures_before_success: 2,
        };
        process(&handler, &event(), 3).await;
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_process_abandons_after_attempt_ceiling() {
        let handler = FlakyHandler {
            calls: AtomicU32::new(0),
            failures_before_success: u32::MAX,
        };
        process(&handler, &event(), 3).await;
        assert_eq!(handler.calls.load(Ordering::SeqCst), 3);
    }
}
