use super::DeleteResponse;
use crate::api::error::AppError;
use crate::store::NewsRecord;
use crate::utils::validation::{require_text, sanitize_filename};
use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use utoipa::ToSchema;

/// Schema-only mirror of the multipart news form.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct NewsUploadForm {
    pub title: String,
    /// Article body; `description` is accepted as an alias.
    pub content: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<String>,
}

#[utoipa::path(
    get,
    path = "/news",
    responses(
        (status = 200, description = "All news records, newest first", body = [NewsRecord])
    ),
    tag = "news"
)]
pub async fn list_news(State(state): State<crate::AppState>) -> Json<Vec<NewsRecord>> {
    Json(state.store.list_news().await)
}

#[utoipa::path(
    post,
    path = "/upload/news",
    request_body(content = NewsUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored news record", body = NewsRecord),
        (status = 400, description = "Missing title or content")
    ),
    tag = "news"
)]
pub async fn upload_news(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<NewsRecord>, AppError> {
    let mut title = String::new();
    let mut content = String::new();
    let mut image: Option<(String, axum::body::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => title = field.text().await.unwrap_or_default(),
            // Older clients send `description` for the article body.
            "content" | "description" => content = field.text().await.unwrap_or_default(),
            "image" => {
                let original_filename = field.file_name().unwrap_or("unnamed").to_string();
                let filename = sanitize_filename(&original_filename)
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    image = Some((filename, bytes));
                }
            }
            _ => {}
        }
    }

    let title = require_text("title", &title).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let content =
        require_text("content", &content).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let record = state
        .store
        .insert_news(
            title,
            content,
            image.as_ref().map(|(name, bytes)| (name.as_str(), bytes.as_ref())),
        )
        .await?;

    tracing::info!("📰 Published news {} ({})", record.id, record.title);
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/news/{id}",
    params(
        ("id" = String, Path, description = "News record id")
    ),
    responses(
        (status = 200, description = "Record and cover image deleted", body = DeleteResponse),
        (status = 404, description = "No record with that id")
    ),
    tag = "news"
)]
pub async fn delete_news(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.store.remove_news(&id).await?;

    tracing::info!("🗑️  Deleted news {}", id);
    Ok(Json(DeleteResponse::ok()))
}
