use super::DocumentStore;
use crate::models::errors::AppError;
use async_trait::async_trait;
use mongodb::{
    bson::{self, Bson, Document},
    Client, Collection,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily created MongoDB client shared by every collection store.
///
/// The client is built on first use. A failed attempt is not remembered,
/// so the next request tries again.
pub struct MongoConnection {
    uri: Option<String>,
    client: OnceCell<Client>,
}

impl MongoConnection {
    pub fn new(uri: Option<String>) -> Self {
        Self {
            uri,
            client: OnceCell::new(),
        }
    }

    pub async fn client(&self) -> Result<&Client, AppError> {
        self.client
            .get_or_try_init(|| async {
                let uri = self
                    .uri
                    .as_deref()
                    .ok_or_else(|| AppError::missing_config("MONGO_URI"))?;

                let client = Client::with_uri_str(uri)
                    .await
                    .map_err(|e| AppError::document_store_failed(e.to_string()))?;

                tracing::info!("Created MongoDB client");
                Ok::<_, AppError>(client)
            })
            .await
    }
}

/// MongoDB-backed store writing into one collection.
pub struct MongoDocumentStore {
    connection: Arc<MongoConnection>,
    database: String,
    collection: String,
}

impl MongoDocumentStore {
    pub fn new(
        connection: Arc<MongoConnection>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            connection,
            database: database.into(),
            collection: collection.into(),
        }
    }

    async fn collection(&self) -> Result<Collection<Document>, AppError> {
        let client = self.connection.client().await?;
        Ok(client
            .database(&self.database)
            .collection::<Document>(&self.collection))
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn insert(&self, document: Value) -> Result<String, AppError> {
        let collection = self.collection().await?;
        let document = to_bson_document(&document)?;

        let result = collection
            .insert_one(document)
            .await
            .map_err(|e| AppError::document_store_failed(e.to_string()))?;

        tracing::debug!("Inserted into {}.{}", self.database, self.collection);
        Ok(render_id(result.inserted_id))
    }
}

/// Convert a JSON document to BSON. Only objects can be stored; numbers
/// outside the signed 64-bit range are refused by the encoder.
pub(crate) fn to_bson_document(value: &Value) -> Result<Document, AppError> {
    let kind = match value {
        Value::Object(_) => {
            return bson::to_document(value)
                .map_err(|e| AppError::document_store_failed(e.to_string()));
        }
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
    };

    Err(AppError::document_store_failed(format!(
        "document must be a JSON object, got {}",
        kind
    )))
}

/// Text form of an inserted `_id`: hex for ObjectIds, the raw value for strings.
fn render_id(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s,
        other => other.into_relaxed_extjson().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn round_trip(value: &Value) -> Value {
        Bson::Document(to_bson_document(value).unwrap()).into_relaxed_extjson()
    }

    #[test]
    fn test_render_object_id_as_hex() {
        let oid = ObjectId::new();
        let rendered = render_id(Bson::ObjectId(oid));

        assert_eq!(rendered.len(), 24);
        assert_eq!(rendered, oid.to_hex());
    }

    #[test]
    fn test_render_caller_supplied_ids() {
        assert_eq!(render_id(Bson::String("order-17".to_string())), "order-17");
        assert_eq!(render_id(Bson::Int32(42)), "42");
    }

    #[test]
    fn test_documents_convert_without_loss() {
        let documents = [
            json!({"matrix": [[1, 2], [3, [4, 5]]], "empty": []}),
            json!({"ratio": 2.5, "offset": -0.125, "count": 7, "negative": -3}),
            json!({"missing": null, "list": [null, {"deep": null}]}),
            json!({"_id": "order-17", "items": [{"sku": "A-1", "qty": 2}]}),
            json!({"unicode": "Grüße 日本語", "flag": false}),
        ];

        for document in documents {
            assert_eq!(round_trip(&document), document);
        }
    }

    #[test]
    fn test_conversion_refuses_unsigned_overflow() {
        let err = to_bson_document(&json!({"big": u64::MAX})).unwrap_err();

        assert!(matches!(err, AppError::DocumentStoreError { .. }));
        assert!(err.to_string().contains(&u64::MAX.to_string()), "{}", err);

        let fits = json!({"edge": i64::MAX as u64});
        assert_eq!(round_trip(&fits), fits);
    }

    #[test]
    fn test_conversion_refuses_non_object_roots() {
        let cases = [
            (json!([1, 2, 3]), "document must be a JSON object, got an array"),
            (json!("text"), "document must be a JSON object, got a string"),
            (json!(12), "document must be a JSON object, got a number"),
            (json!(true), "document must be a JSON object, got a boolean"),
            (json!(null), "document must be a JSON object, got null"),
        ];

        for (value, message) in cases {
            assert_eq!(to_bson_document(&value).unwrap_err().to_string(), message);
        }
    }

    #[tokio::test]
    async fn test_missing_uri_fails_on_first_use() {
        let connection = Arc::new(MongoConnection::new(None));
        let store = MongoDocumentStore::new(connection, "mydatabase", "mycollection");

        let err = store.insert(json!({"name": "widget"})).await.unwrap_err();
        assert_eq!(err.to_string(), "MONGO_URI is not configured");
    }

    #[tokio::test]
    async fn test_invalid_uri_is_reported_and_retried() {
        let connection = Arc::new(MongoConnection::new(Some("not-a-mongo-uri".to_string())));
        let store = MongoDocumentStore::new(connection.clone(), "db", "coll");

        assert!(matches!(
            store.insert(json!({"a": 1})).await,
            Err(AppError::DocumentStoreError { .. })
        ));
        // Still uninitialized; the next call attempts the connection again.
        assert!(connection.client.get().is_none());
        assert!(store.insert(json!({"a": 1})).await.is_err());
    }

    #[tokio::test]
    async fn test_stores_share_one_connection() {
        let connection = Arc::new(MongoConnection::new(None));
        let documents = MongoDocumentStore::new(connection.clone(), "db", "documents");
        let reports = MongoDocumentStore::new(connection.clone(), "db", "reports");

        assert!(documents.insert(json!({"a": 1})).await.is_err());
        assert!(reports.insert(json!({"a": 1})).await.is_err());
        assert_eq!(Arc::strong_count(&connection), 3);
    }
}
