pub mod asset_store;
pub mod elevenlabs_provider;
pub mod job_repository;
pub mod key_repository;
pub mod s3_asset_store;
pub mod synthesis_provider;

pub use asset_store::{AssetStore, PublishError};
pub use elevenlabs_provider::ElevenLabsProvider;
pub use job_repository::{JobRepository, JobStore};
pub use key_repository::{KeyRepository, KeyStore, NewSynthesisKey};
pub use s3_asset_store::S3AssetStore;
pub use synthesis_provider::{SynthesisError, SynthesisProvider};
