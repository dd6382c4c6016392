use serde::{Deserialize, Serialize};

/// Returned after a document is inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreResponse {
    pub message: String,
    pub id: String,
}

/// Returned after a file lands in the bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl StoreResponse {
    pub fn stored(id: impl Into<String>) -> Self {
        Self {
            message: "Data stored successfully".to_string(),
            id: id.into(),
        }
    }
}

impl UploadResponse {
    pub fn uploaded(url: impl Into<String>) -> Self {
        Self {
            message: "Image uploaded successfully".to_string(),
            url: url.into(),
        }
    }
}
