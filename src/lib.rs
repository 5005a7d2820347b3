pub mod api;
pub mod config;
pub mod store;
pub mod utils;

use crate::config::AppConfig;
use crate::store::RecordStore;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::media::list_media,
        api::handlers::media::upload_media,
        api::handlers::media::delete_media,
        api::handlers::news::list_news,
        api::handlers::news::upload_news,
        api::handlers::news::delete_news,
    ),
    components(
        schemas(
            store::records::MediaRecord,
            store::records::NewsRecord,
            store::records::MediaType,
            api::handlers::DeleteResponse,
            api::handlers::media::DeleteMediaRequest,
            api::handlers::media::MediaUploadForm,
            api::handlers::news::NewsUploadForm,
        )
    ),
    tags(
        (name = "media", description = "Gallery upload and listing endpoints"),
        (name = "news", description = "News article endpoints"),
        (name = "system", description = "Health check")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::health::health_check))
        .route("/media", get(api::handlers::media::list_media))
        // Alias kept for browsers poking at the gallery directly.
        .route("/gallery", get(api::handlers::media::list_media))
        .route("/upload", post(api::handlers::media::upload_media))
        .route("/delete", post(api::handlers::media::delete_media))
        .route("/news", get(api::handlers::news::list_news))
        .route("/upload/news", post(api::handlers::news::upload_news))
        .route("/news/:id", delete(api::handlers::news::delete_news))
        .nest_service(
            "/uploads",
            ServeDir::new(state.store.upload_root().to_path_buf()),
        )
        .layer(cors)
        .with_state(state)
}
