//! S3-based presigned uploads for book files
mod error;

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};

pub use error::{BookUploadsError, BookUploadsResult};

/// Upload issuer for the books bucket
pub struct BookUploads {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    presigned_url_expiry_secs: u64,
}

impl BookUploads {
    /// Creates a new book upload issuer
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name receiving book files
    /// * `presigned_url_expiry_secs` - Lifetime of issued URLs in seconds
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        presigned_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            presigned_url_expiry_secs,
        }
    }

    /// Generates a presigned PUT URL for uploading a book file by name
    ///
    /// The caller uploads directly to the bucket; ingestion is triggered by
    /// the bucket's own object-created notification, not by this API.
    ///
    /// # Errors
    ///
    /// Returns `BookUploadsError::ConfigError` if the presigning config is
    /// invalid and `BookUploadsError::S3Error` if URL generation fails
    pub async fn presigned_put_url(&self, file_name: &str) -> BookUploadsResult<String> {
        let presigned_config =
            PresigningConfig::expires_in(Duration::from_secs(self.presigned_url_expiry_secs))
                .map_err(|e| {
                    BookUploadsError::ConfigError(format!(
                        "Failed to create presigning config: {e}"
                    ))
                })?;

        let presigned_url = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(file_name)
            .presigned(presigned_config)
            .await
            .map_err(|e| {
                BookUploadsError::S3Error(format!("Failed to generate presigned URL: {e}"))
            })?;

        Ok(presigned_url.uri().to_string())
    }
}
