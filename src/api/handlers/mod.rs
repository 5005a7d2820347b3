pub mod health;
pub mod media;
pub mod news;

use serde::Serialize;
use utoipa::ToSchema;

/// Body returned by every successful delete endpoint.
#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
