//! Object storage for the upload endpoint.
//!
//! Uploads go to one configured bucket; the returned URL is built from the
//! bucket, region and key rather than read back from the storage service.

pub mod mock;
pub mod s3;

pub use mock::MockObjectStore;
pub use s3::S3ObjectStore;

use crate::models::errors::AppError;
use async_trait::async_trait;
use axum::body::Bytes;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `key`, replacing any existing object, and return its URL.
    async fn upload(&self, key: &str, data: Bytes) -> Result<String, AppError>;
}

/// Virtual-hosted-style S3 URL for `key`.
pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}
