//! S3-compatible blob storage (MinIO in development)

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::{debug, info};

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::{BlobStorage, UploadedFile};

pub struct S3BlobStorage {
    bucket: Box<Bucket>,
    public_endpoint: String,
    prefix: String,
}

impl S3BlobStorage {
    pub fn new(config: StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create S3 credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Internal(format!("Failed to open S3 bucket: {}", e)))?;

        // MinIO wants http://endpoint/bucket rather than http://bucket.endpoint
        bucket.set_path_style();

        info!(
            "Blob storage initialized for endpoint: {}, bucket: {}, prefix: {}",
            config.endpoint,
            bucket.name(),
            config.document_prefix
        );

        Ok(Self {
            bucket,
            public_endpoint: config.public_endpoint.trim_end_matches('/').to_string(),
            prefix: config.document_prefix.trim_matches('/').to_string(),
        })
    }

    fn object_key(&self, key: &str) -> String {
        format!("{}/{}", self.prefix, key.trim_start_matches('/'))
    }

    fn public_url(&self, object_key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), object_key)
    }
}

#[async_trait]
impl BlobStorage for S3BlobStorage {
    async fn store(&self, key: &str, file: UploadedFile) -> Result<String> {
        let object_key = self.object_key(key);

        self.bucket
            .put_object_with_content_type(&object_key, &file.data, &file.content_type)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upload '{}': {}", object_key, e);
                AppError::ExternalServiceError(format!("Failed to store '{}'", file.file_name))
            })?;

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            object_key,
            file.data.len(),
            self.bucket.name()
        );
        Ok(self.public_url(&object_key))
    }
}
