//! Conversion of uploaded Word documents into report sections.
//!
//! The archive is unpacked in memory. `word/document.xml` is required;
//! styles, numbering and relationships are applied when present. Embedded
//! images are pushed to object storage and referenced by URL.

pub mod body;
pub mod numbering;
pub mod sections;
pub mod styles;
pub mod xml;

use crate::models::errors::AppError;
use crate::models::report::{Block, Section};
use crate::services::objects::ObjectStore;
use crate::utils::filename::secure_filename;
use axum::body::Bytes;
use body::BodyParser;
use numbering::Numbering;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use styles::StyleSheet;
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const NUMBERING_PART: &str = "word/numbering.xml";
const RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";

/// Upper bound on the decompressed size of any single part.
pub const MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("not a readable ZIP archive: {0}")]
    Archive(#[from] ZipError),

    #[error("missing part {0}")]
    MissingPart(String),

    #[error("part {0} exceeds {max} bytes", max = MAX_PART_SIZE)]
    PartTooLarge(String),

    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("failed to read archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("document conversion task failed: {0}")]
    Task(String),
}

impl From<DocxError> for AppError {
    fn from(error: DocxError) -> Self {
        match error {
            DocxError::Task(_) => AppError::internal_error(error.to_string()),
            other => AppError::invalid_document(other.to_string()),
        }
    }
}

/// A media part referenced from the document body.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub path: String,
    /// `None` when the relationship points at a part the archive lacks.
    pub data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocx {
    pub blocks: Vec<Block>,
    pub media: Vec<MediaFile>,
}

/// Read a part, or `None` when the archive does not contain it.
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, DocxError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut data = Vec::new();
    file.take(MAX_PART_SIZE + 1).read_to_end(&mut data)?;
    if data.len() as u64 > MAX_PART_SIZE {
        return Err(DocxError::PartTooLarge(name.to_string()));
    }

    Ok(Some(data))
}

fn read_xml<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<xml::Element>, DocxError> {
    let Some(data) = read_part(archive, name)? else {
        return Ok(None);
    };
    let text = String::from_utf8(data).map_err(|e| DocxError::Xml(format!("{}: {}", name, e)))?;
    xml::parse(&text).map(Some)
}

/// Relationship id to target, for internal targets only.
fn parse_relationships(root: &xml::Element) -> HashMap<String, String> {
    root.elements()
        .filter(|e| e.name == "Relationship")
        .filter(|e| e.attr("TargetMode") != Some("External"))
        .filter_map(|e| Some((e.attr("Id")?.to_string(), e.attr("Target")?.to_string())))
        .collect()
}

/// Parse a `.docx` archive into body blocks plus the media they reference.
pub fn parse_docx(data: &[u8]) -> Result<ParsedDocx, DocxError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let document = read_xml(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
    let styles = read_xml(&mut archive, STYLES_PART)?
        .map(|root| StyleSheet::parse(&root))
        .unwrap_or_default();
    let numbering = read_xml(&mut archive, NUMBERING_PART)?
        .map(|root| Numbering::parse(&root))
        .unwrap_or_default();
    let relationships = read_xml(&mut archive, RELATIONSHIPS_PART)?
        .map(|root| parse_relationships(&root))
        .unwrap_or_default();

    let body = document
        .child("w:body")
        .ok_or_else(|| DocxError::Xml("document has no w:body".to_string()))?;

    let mut parser = BodyParser::new(&styles, &numbering, &relationships);
    let blocks = parser.parse_blocks(body);

    let mut media = Vec::new();
    for path in parser.into_media() {
        let data = read_part(&mut archive, &path)?;
        media.push(MediaFile { path, data });
    }

    Ok(ParsedDocx { blocks, media })
}

/// Object key for a media part: the sanitized file name under `prefix`.
pub fn media_key(prefix: &str, index: usize, path: &str) -> String {
    let file_name = secure_filename(path.rsplit('/').next().unwrap_or(path));
    if file_name.is_empty() {
        format!("{}/media-{}", prefix, index)
    } else {
        format!("{}/{}", prefix, file_name)
    }
}

/// Upload every media part. A part that cannot be uploaded is logged and
/// left without a URL; the rest of the report is still produced.
pub async fn upload_media(
    media: Vec<MediaFile>,
    objects: &dyn ObjectStore,
    prefix: &str,
) -> Vec<Option<String>> {
    let mut urls = Vec::with_capacity(media.len());

    for (index, file) in media.into_iter().enumerate() {
        let Some(data) = file.data else {
            tracing::warn!(path = %file.path, "Referenced media part is missing from the archive");
            urls.push(None);
            continue;
        };

        let key = media_key(prefix, index, &file.path);
        let size = data.len();
        match objects.upload(&key, Bytes::from(data)).await {
            Ok(url) => {
                tracing::debug!("Uploaded {} ({} bytes) as {}", file.path, size, key);
                urls.push(Some(url));
            }
            Err(e) => {
                tracing::error!(
                    key = %key,
                    size,
                    error = ?e,
                    "Error uploading report image to object storage"
                );
                urls.push(None);
            }
        }
    }

    urls
}

/// Replace media indexes with uploaded URLs, including images inside tables.
pub fn resolve_images(blocks: &mut [Block], urls: &[Option<String>]) {
    for block in blocks {
        match block {
            Block::Image(image) => {
                image.src = image
                    .media
                    .and_then(|index| urls.get(index).cloned().flatten());
            }
            Block::Table(table) => {
                for cell in table.rows.iter_mut().flatten() {
                    resolve_images(&mut cell.content, urls);
                }
            }
            Block::Paragraph(_) | Block::Section(_) => {}
        }
    }
}

/// Convert an uploaded document into report sections.
pub async fn extract_report(
    data: Bytes,
    objects: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<Section>, DocxError> {
    let parsed = tokio::task::spawn_blocking(move || parse_docx(&data))
        .await
        .map_err(|e| DocxError::Task(e.to_string()))??;

    let urls = upload_media(parsed.media, objects, prefix).await;

    let mut blocks = parsed.blocks;
    resolve_images(&mut blocks, &urls);

    Ok(sections::map_sections(blocks))
}
