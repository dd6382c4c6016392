use super::multipart::read_file_part;
use crate::models::{errors::AppError, report::Report};
use crate::services::docx;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    response::Json,
};
use chrono::{SecondsFormat, Utc};
use mongodb::bson::oid::ObjectId;

const FILE_FIELD: &str = "file";
const MEDIA_FOLDER: &str = "docx";

/// Convert an uploaded `.docx` into report sections, store it, and return
/// the stored report
pub async fn upload_report(
    State(app_state): State<AppState>,
    request: Request<Body>,
) -> Result<Json<Report>, AppError> {
    let part = read_file_part(request, FILE_FIELD, app_state.config.max_file_size).await?;
    let size = part.data.len();

    // Images of one upload share a folder so equal names never collide.
    let prefix = format!("{}/{}", MEDIA_FOLDER, ObjectId::new().to_hex());

    let content = docx::extract_report(part.data, app_state.objects.as_ref(), &prefix)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to convert {:?}: {}", part.file_name, e);
            AppError::from(e)
        })?;

    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut report = Report {
        id: None,
        content,
        created_at: now.clone(),
        updated_at: now,
    };

    let document = serde_json::to_value(&report)
        .map_err(|e| AppError::internal_error(format!("Failed to encode report: {}", e)))?;

    let id = app_state.reports.insert(document).await.map_err(|e| {
        tracing::error!(file = %part.file_name, error = ?e, "Error storing report");
        e
    })?;

    tracing::info!(
        "Stored report {} from {:?} ({} bytes, {} sections)",
        id,
        part.file_name,
        size,
        report.content.len()
    );

    report.id = Some(id);
    Ok(Json(report))
}
