use crate::models::errors::AppError;
use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::header::CONTENT_TYPE,
};
use futures_util::TryStreamExt;
use multer::{Field, Multipart};

pub(crate) const NO_FILE_PART: &str = "No file part";
pub(crate) const NO_SELECTED_FILE: &str = "No selected file";

/// A file part read from a multipart request.
pub(crate) struct FilePart {
    /// Client-supplied name, never empty.
    pub file_name: String,
    pub data: Bytes,
}

/// Find the part named `field_name` that carries a filename and buffer it.
pub(crate) async fn read_file_part(
    request: Request<Body>,
    field_name: &str,
    max_size: usize,
) -> Result<FilePart, AppError> {
    let boundary = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| AppError::validation_failed(NO_FILE_PART))?;

    let stream = request
        .into_body()
        .into_data_stream()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));

    let mut multipart = Multipart::new(stream, boundary);

    // Parts without a filename are plain form values, not files.
    let mut field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(field_name) && field.file_name().is_some() => {
                break field;
            }
            Ok(Some(field)) => {
                tracing::debug!("Skipping multipart field {:?}", field.name());
            }
            Ok(None) => return Err(AppError::validation_failed(NO_FILE_PART)),
            Err(e) => {
                tracing::debug!("Failed to read multipart field: {}", e);
                return Err(AppError::validation_failed(NO_FILE_PART));
            }
        }
    };

    let file_name = field.file_name().unwrap_or_default().to_string();
    if file_name.is_empty() {
        return Err(AppError::validation_failed(NO_SELECTED_FILE));
    }

    let data = read_field(&mut field, max_size).await?;
    Ok(FilePart { file_name, data })
}

/// Buffer a field, refusing to grow past `max_size` bytes.
async fn read_field(field: &mut Field<'_>, max_size: usize) -> Result<Bytes, AppError> {
    let mut buffer = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        tracing::debug!("Failed to read file data: {}", e);
        AppError::validation_failed(NO_FILE_PART)
    })? {
        if buffer.len() + chunk.len() > max_size {
            return Err(AppError::payload_too_large(max_size));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buffer))
}
