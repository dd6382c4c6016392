use super::multipart::{read_file_part, NO_SELECTED_FILE};
use crate::models::{errors::AppError, responses::UploadResponse};
use crate::utils::filename::secure_filename;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    response::Json,
};

const FILE_FIELD: &str = "file";

/// Handle a multipart upload and push the `file` part to object storage
pub async fn upload_image(
    State(app_state): State<AppState>,
    request: Request<Body>,
) -> Result<Json<UploadResponse>, AppError> {
    let part = read_file_part(request, FILE_FIELD, app_state.config.max_file_size).await?;

    let key = secure_filename(&part.file_name);
    if key.is_empty() {
        tracing::debug!("Filename {:?} sanitized to nothing", part.file_name);
        return Err(AppError::validation_failed(NO_SELECTED_FILE));
    }

    let size = part.data.len();

    let url = app_state.objects.upload(&key, part.data).await.map_err(|e| {
        tracing::error!(key = %key, size, error = ?e, "Error uploading image to object storage");
        e
    })?;

    tracing::info!(
        "Uploaded file {:?} as {} ({} bytes)",
        part.file_name,
        key,
        size
    );

    Ok(Json(UploadResponse::uploaded(url)))
}
