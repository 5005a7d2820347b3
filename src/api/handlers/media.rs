use super::DeleteResponse;
use crate::api::error::AppError;
use crate::store::{MediaRecord, MediaType};
use crate::utils::validation::sanitize_filename;
use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Deserialize;
use utoipa::ToSchema;

/// Schema-only mirror of the multipart upload form.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct MediaUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: String,
    /// image | video | audio (defaults to image)
    #[schema(example = "video")]
    pub r#type: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteMediaRequest {
    /// Record path as returned by upload, e.g. `uploads/video/123-clip.mp4`.
    pub path: Option<String>,
}

#[utoipa::path(
    get,
    path = "/media",
    responses(
        (status = 200, description = "All gallery records, newest first", body = [MediaRecord])
    ),
    tag = "media"
)]
pub async fn list_media(State(state): State<crate::AppState>) -> Json<Vec<MediaRecord>> {
    Json(state.store.list_media().await)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = MediaUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored media record", body = MediaRecord),
        (status = 400, description = "No file uploaded or unknown type")
    ),
    tag = "media"
)]
pub async fn upload_media(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<MediaRecord>, AppError> {
    let mut file: Option<(String, axum::body::Bytes)> = None;
    let mut media_type = MediaType::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let original_filename = field.file_name().unwrap_or("unnamed").to_string();
            let filename = sanitize_filename(&original_filename)
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            file = Some((filename, bytes));
        } else if name == "type" {
            let text = field.text().await.unwrap_or_default();
            media_type = MediaType::parse(&text)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown media type '{}'", text.trim())))?;
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    }

    let record = state.store.insert_media(&filename, &bytes, media_type).await?;

    tracing::info!("📷 Uploaded {} ({})", record.path, record.media_type);
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/delete",
    request_body = DeleteMediaRequest,
    responses(
        (status = 200, description = "Record and file deleted", body = DeleteResponse),
        (status = 400, description = "Missing path"),
        (status = 404, description = "No record with that path")
    ),
    tag = "media"
)]
pub async fn delete_media(
    State(state): State<crate::AppState>,
    Json(req): Json<DeleteMediaRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    let path = req
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing path".to_string()))?;

    state.store.remove_media(&path).await?;

    tracing::info!("🗑️  Deleted {}", path);
    Ok(Json(DeleteResponse::ok()))
}
