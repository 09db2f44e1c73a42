//! Blob storage for supporting documents
//!
//! `BlobStorage` is the seam the ticket service talks to; `S3BlobStorage`
//! is the MinIO/S3 implementation wired in `main`.

mod blob_storage;
mod s3_blob_storage;

pub use blob_storage::{BlobStorage, UploadedFile};
pub use s3_blob_storage::S3BlobStorage;
