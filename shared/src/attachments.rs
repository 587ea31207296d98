use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;

use crate::error::{BookError, Result};

/// Public URL of the object stored under `key` in `bucket`.
pub fn public_object_url(bucket: &str, key: &str) -> String {
    format!("http://{}.s3.amazonaws.com/{}", bucket, key)
}

/// Cover-image storage addressed by book id.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Where the attachment for `book_id` is readable once uploaded. No network call.
    fn attachment_url(&self, book_id: &str) -> String;

    /// A short-lived pre-signed `PUT` URL for the same object.
    async fn upload_url(&self, book_id: &str) -> Result<String>;
}

pub struct S3AttachmentStore {
    client: S3Client,
    bucket_name: String,
    expiration: Duration,
}

impl S3AttachmentStore {
    pub fn new(client: S3Client, bucket_name: impl Into<String>, expiration: Duration) -> Self {
        Self {
            client,
            bucket_name: bucket_name.into(),
            expiration,
        }
    }
}

#[async_trait]
impl AttachmentStore for S3AttachmentStore {
    fn attachment_url(&self, book_id: &str) -> String {
        public_object_url(&self.bucket_name, book_id)
    }

    async fn upload_url(&self, book_id: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.expiration)
            .map_err(|e| BookError::Config(format!("Invalid presigning config: {}", e)))?;

        let presigned_request = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(book_id)
            .presigned(presigning)
            .await
            .map_err(|e| {
                BookError::Attachment(format!(
                    "Failed to generate presigned URL: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::info!(
            book_id = %book_id,
            expires_in = self.expiration.as_secs(),
            "Issued attachment upload URL"
        );
        Ok(presigned_request.uri().to_string())
    }
}
