use super::{object_url, ObjectStore};
use crate::models::errors::AppError;
use async_trait::async_trait;
use axum::body::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    bucket: String,
    region: String,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            bucket: "mock-bucket".to_string(),
            region: "us-east-1".to_string(),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_location(mut self, bucket: impl Into<String>, region: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self.region = region.into();
        self
    }

    /// Make every following upload fail with `message`; `None` clears it.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn upload(&self, key: &str, data: Bytes) -> Result<String, AppError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(AppError::object_store_failed(message));
        }

        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(object_url(&self.bucket, &self.region, key))
    }
}
