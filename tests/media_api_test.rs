use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_media_backend::config::AppConfig;
use rust_media_backend::store::RecordStore;
use rust_media_backend::{AppState, create_app};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "---------------------------123456789012345678901234567";

fn test_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        upload_root: dir.path().join("uploads"),
        data_dir: dir.path().join("data"),
        ..AppConfig::default()
    };
    let store = Arc::new(RecordStore::open(&config.upload_root, &config.data_dir).unwrap());
    let app = create_app(AppState { store, config });
    (dir, app)
}

fn upload_request(filename: &str, content: &str, media_type: Option<&str>) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
        Content-Type: application/octet-stream\r\n\r\n\
        {content}\r\n"
    );
    if let Some(t) = media_type {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
            Content-Disposition: form-data; name=\"type\"\r\n\r\n\
            {t}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Media backend is running");
}

#[tokio::test]
async fn test_upload_and_list_flow() {
    let (_dir, app) = test_app();

    // Upload a video clip
    let response = app
        .clone()
        .oneshot(upload_request("clip.mp4", "fake mp4 bytes", Some("video")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let uploaded = json_body(response).await;
    let path = uploaded["path"].as_str().unwrap();
    assert!(path.starts_with("uploads/video/"));
    assert!(path.ends_with("-clip.mp4"));
    assert_eq!(uploaded["type"], "video");
    assert_eq!(uploaded["name"], "clip.mp4");
    assert!(uploaded["createdAt"].is_string());

    // Second upload lands first in the list
    let response = app
        .clone()
        .oneshot(upload_request("photo.png", "fake png bytes", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = json_body(response).await;
    assert_eq!(second["type"], "image");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/media").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    let items = listed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], second["id"]);
    assert_eq!(items[1]["path"], path);

    // /gallery is an alias for /media
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/gallery")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 2);

    // The raw file is served back under /uploads
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{path}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"fake mp4 bytes");
}

#[tokio::test]
async fn test_upload_without_file_rejected() {
    let (_dir, app) = test_app();

    let body = format!(
        "--{BOUNDARY}\r\n\
        Content-Disposition: form-data; name=\"type\"\r\n\r\n\
        image\r\n\
        --{BOUNDARY}--\r\n"
    );
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Collection untouched
    let response = app
        .oneshot(Request::builder().uri("/media").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_empty_file_rejected() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(upload_request("empty.png", "", Some("image")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_unknown_type_rejected() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(upload_request("doc.pdf", "pdf bytes", Some("document")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_flow() {
    let (dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(upload_request("gone.jpg", "jpeg bytes", Some("image")))
        .await
        .unwrap();
    let uploaded = json_body(response).await;
    let path = uploaded["path"].as_str().unwrap().to_string();

    let on_disk = dir
        .path()
        .join("uploads")
        .join(path.strip_prefix("uploads/").unwrap());
    assert!(on_disk.exists());

    // Delete by path
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/delete")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&serde_json::json!({ "path": path })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);
    assert!(!on_disk.exists());

    // Second delete of the same path is a 404
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/delete")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&serde_json::json!({ "path": path })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(Request::builder().uri("/media").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_requires_path() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/delete")
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_unknown_path_leaves_document_unchanged() {
    let (dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(upload_request("keep.png", "png bytes", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let document = dir.path().join("data").join("gallery.json");
    let before = std::fs::read(&document).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/delete")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"path": "uploads/gallery/123-clip.mp4"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let after = std::fs::read(&document).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_concurrent_uploads_all_survive() {
    let (_dir, app) = test_app();

    let uploads = (0..6).map(|i| {
        let app = app.clone();
        async move {
            let response = app
                .oneshot(upload_request(
                    &format!("file-{i}.png"),
                    "png bytes",
                    Some("image"),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    });
    futures::future::join_all(uploads).await;

    let response = app
        .oneshot(Request::builder().uri("/media").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(response).await.as_array().unwrap().len(), 6);
}
