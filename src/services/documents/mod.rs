//! Document persistence for stored JSON and converted reports.
//!
//! The HTTP layer only sees [`DocumentStore`]; production wires in
//! [`MongoDocumentStore`], tests use [`MockDocumentStore`].

pub mod mock;
pub mod mongo;

pub use mock::MockDocumentStore;
pub use mongo::{MongoConnection, MongoDocumentStore};

use crate::models::errors::AppError;
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `document` verbatim and return the identifier the store assigned.
    async fn insert(&self, document: Value) -> Result<String, AppError>;
}
