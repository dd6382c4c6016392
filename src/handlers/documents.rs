use crate::models::{errors::AppError, responses::StoreResponse};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::Json,
};
use serde_json::Value;

const NO_DATA: &str = "No data provided";

/// Store an arbitrary JSON document and return the id the database assigned
pub async fn store_json(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<StoreResponse>, AppError> {
    let body = body.map_err(|rejection| {
        tracing::debug!("Failed to read request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::payload_too_large(app_state.config.max_file_size)
        } else {
            AppError::validation_failed(NO_DATA)
        }
    })?;

    if !is_json_content_type(&headers) {
        return Err(AppError::validation_failed(NO_DATA));
    }

    let document = parse_document(&body)?;

    let id = app_state.documents.insert(document).await.map_err(|e| {
        tracing::debug!("Document insert failed: {}", e);
        e
    })?;

    tracing::info!("Stored document {}", id);
    Ok(Json(StoreResponse::stored(id)))
}

/// `application/json` or any `application/*+json` type.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .map(|mime| {
            mime.type_() == mime::APPLICATION
                && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
        })
        .unwrap_or(false)
}

fn parse_document(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::validation_failed(NO_DATA));
    }

    // A declared JSON body that fails to parse is a server-side decode error.
    let document: Value = serde_json::from_slice(body).map_err(|e| {
        AppError::internal_error(format!("Failed to decode JSON object: {}", e))
    })?;

    if is_empty_value(&document) {
        return Err(AppError::validation_failed(NO_DATA));
    }

    Ok(document)
}

/// `null`, `false`, zero, and empty strings, arrays, or objects carry no data.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([]), json!({})] {
            assert!(is_empty_value(&value), "{} should count as empty", value);
        }
        for value in [json!(true), json!(-1), json!("x"), json!([0]), json!({"a": null})] {
            assert!(!is_empty_value(&value), "{} should count as data", value);
        }
    }

    #[test]
    fn test_parse_document_rejects_missing_body() {
        let err = parse_document(b"").unwrap_err();
        assert_eq!(err.to_string(), NO_DATA);

        let err = parse_document(b"  \n").unwrap_err();
        assert_eq!(err.to_string(), NO_DATA);
    }

    #[test]
    fn test_parse_document_reports_malformed_json() {
        let err = parse_document(b"{\"name\": ").unwrap_err();
        assert!(matches!(err, AppError::InternalError { .. }));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Failed to decode JSON object: "));
    }

    fn headers_with(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    #[test]
    fn test_json_content_types() {
        for accepted in [
            "application/json",
            "application/json; charset=utf-8",
            "Application/JSON",
            "application/ld+json",
            "application/vnd.api+json",
        ] {
            assert!(is_json_content_type(&headers_with(accepted)), "{}", accepted);
        }

        for rejected in [
            "text/plain",
            "text/json",
            "application/xml",
            "multipart/form-data; boundary=x",
            "json",
        ] {
            assert!(!is_json_content_type(&headers_with(rejected)), "{}", rejected);
        }

        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn test_parse_document_keeps_structure() {
        let document = parse_document(br#"{"nested": {"list": [1, 2.5, "three"]}}"#).unwrap();
        assert_eq!(document, json!({"nested": {"list": [1, 2.5, "three"]}}));
    }
}
