use super::asset_store::{AssetStore, PublishError};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;

/// S3 implementation of the asset store. Objects are keyed by job id, so a
/// retried upload lands on the same key instead of piling up duplicates.
pub struct S3AssetStore {
    s3_client: Arc<S3Client>,
    bucket: String,
    region: String,
    public_base_url: Option<String>,
}

impl S3AssetStore {
    pub fn new(
        s3_client: Arc<S3Client>,
        bucket: String,
        region: String,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            s3_client,
            bucket,
            region,
            public_base_url: public_base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    fn object_key(folder: &str, object_name: &str) -> String {
        format!("{}/{}.mp3", folder.trim_matches('/'), object_name)
    }

    fn public_url(&self, object_key: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/{object_key}"),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, object_key
            ),
        }
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn publish(
        &self,
        audio: &[u8],
        folder: &str,
        object_name: &str,
    ) -> Result<String, PublishError> {
        let object_key = Self::object_key(folder, object_name);

        tracing::info!(
            bucket = %self.bucket,
            key = %object_key,
            size_bytes = audio.len(),
            "Uploading audio to object storage"
        );

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type("audio/mpeg")
            .body(ByteStream::from(audio.to_vec()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    bucket = %self.bucket,
                    key = %object_key,
                    error = ?e,
                    "S3 put_object failed"
                );
                PublishError(format!("S3 upload failed: {e}"))
            })?;

        let url = self.public_url(&object_key);
        tracing::info!(url = %url, "Audio published");

        Ok(url)
    }
}
