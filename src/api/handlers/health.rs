#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String)
    ),
    tag = "system"
)]
pub async fn health_check() -> &'static str {
    "Media backend is running"
}
