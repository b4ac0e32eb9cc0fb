use async_trait::async_trait;

/// Durable-storage write failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("storage error: {0}")]
pub struct PublishError(pub String);

/// Outbound boundary to object storage.
///
/// `publish` must be safe to retry: a re-upload for the same object name
/// overwrites the previous object, and the caller only keeps the URL it
/// got back last.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload audio bytes under `folder` and return a publicly resolvable
    /// URL for the stored object.
    async fn publish(
        &self,
        audio: &[u8],
        folder: &str,
        object_name: &str,
    ) -> Result<String, PublishError>;
}
