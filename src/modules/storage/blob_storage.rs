use async_trait::async_trait;

use crate::core::error::Result;

/// A file handed to blob storage
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Stores supporting documents and returns the URL they are reachable at
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn store(&self, key: &str, file: UploadedFile) -> Result<String>;
}
