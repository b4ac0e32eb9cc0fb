pub mod dto;
pub mod error;
pub mod key_pool;
pub mod model;
pub mod service;
pub mod settings;

pub use dto::{CreateJobRequest, CreateJobResponse, JobStatusResponse, SynthesisEvent};
pub use error::TtsJobError;
pub use key_pool::KeyPool;
pub use model::{JobStatus, KeyTier, NewJobRecord, SynthesisKey, TtsJobRecord};
pub use service::{JobOutcome, TtsJobApi, TtsJobService};
pub use settings::VoiceSettings;
