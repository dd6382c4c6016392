#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use serde_json::Value;
use std::io::{Cursor, Write};
use std::time::Duration;
use zip::{write::SimpleFileOptions, ZipWriter};

use content_intake::{
    create_app,
    models::errors::AppError,
    services::{
        documents::{DocumentStore, MockDocumentStore},
        objects::MockObjectStore,
    },
    utils::config::AppConfig,
    AppState,
};

pub const BOUNDARY: &str = "----content-intake-test-boundary";

/// Test application plus handles on the in-memory stores behind it
pub struct TestApp {
    pub router: Router,
    pub documents: MockDocumentStore,
    pub reports: MockDocumentStore,
    pub objects: MockObjectStore,
}

/// Setup a test application over mock stores
pub fn setup_test_app() -> TestApp {
    setup_test_app_with_config(test_config())
}

pub fn setup_test_app_with_config(config: AppConfig) -> TestApp {
    let documents = MockDocumentStore::new();
    let reports = MockDocumentStore::new();
    let objects = MockObjectStore::new().with_location("test-bucket", "us-west-2");

    let app_state = AppState::new(config, documents.clone(), reports.clone(), objects.clone());

    TestApp {
        router: create_app(app_state),
        documents,
        reports,
        objects,
    }
}

/// Document store that takes `delay` to answer every insert.
pub struct SlowDocumentStore {
    pub delay: Duration,
}

#[async_trait]
impl DocumentStore for SlowDocumentStore {
    async fn insert(&self, _document: Value) -> Result<String, AppError> {
        tokio::time::sleep(self.delay).await;
        Ok("slow".to_string())
    }
}

/// An app whose JSON store answers after `delay`.
pub fn setup_slow_app(config: AppConfig, delay: Duration) -> Router {
    let app_state = AppState::new(
        config,
        SlowDocumentStore { delay },
        MockDocumentStore::new(),
        MockObjectStore::new(),
    );
    create_app(app_state)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_file_size: 1024 * 1024,
        ..AppConfig::default()
    }
}

/// One part of a multipart/form-data body
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

/// Create a multipart form body; binary data is written as-is
pub fn create_multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    multipart_request("/api/upload-image", parts)
}

pub fn report_upload_request(parts: &[Part<'_>]) -> Request<Body> {
    multipart_request("/api/reports/upload", parts)
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(create_multipart_body(parts)))
        .unwrap()
}

pub fn store_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .uri("/api/store-json")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Zip `parts` into an in-memory archive.
pub fn docx_archive(parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// `word/document.xml` wrapping `body`.
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>{}</w:body></w:document>"#,
        body
    )
}

/// A paragraph with one plain run, optionally carrying a paragraph style.
pub fn styled_paragraph(style: Option<&str>, text: &str) -> String {
    let properties = style
        .map(|style| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, style))
        .unwrap_or_default();
    format!("<w:p>{}<w:r><w:t>{}</w:t></w:r></w:p>", properties, text)
}

/// A paragraph holding one inline picture that embeds `relationship`.
pub fn picture_paragraph(relationship: &str, description: &str) -> String {
    format!(
        r#"<w:p><w:r><w:drawing><wp:inline><wp:extent cx="952500" cy="476250"/><wp:docPr id="1" name="Picture 1" descr="{}"/><a:graphic><a:graphicData><a:blip r:embed="{}"/></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        description, relationship
    )
}
