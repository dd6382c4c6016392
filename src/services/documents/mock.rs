use super::{mongo::to_bson_document, DocumentStore};
use crate::models::errors::AppError;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory document collection with a switchable outage. Documents go
/// through the same BSON conversion as the MongoDB store.
#[derive(Clone, Default)]
pub struct MockDocumentStore {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every insert fails the way an unreachable server would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.documents.lock().unwrap().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MockDocumentStore {
    async fn insert(&self, document: Value) -> Result<String, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::document_store_failed(
                "Server selection timeout: No available servers",
            ));
        }

        let stored = Bson::Document(to_bson_document(&document)?).into_relaxed_extjson();

        let id = ObjectId::new().to_hex();
        self.documents.lock().unwrap().insert(id.clone(), stored);
        Ok(id)
    }
}
