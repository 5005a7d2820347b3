use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Declared media kind. Declared by the caller at upload time, never sniffed
/// from the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Audio,
}

impl MediaType {
    /// Subdirectory under the upload root for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            "audio" => Some(MediaType::Audio),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gallery item: an uploaded image, video or audio file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: String,
    /// Original (sanitized) upload filename.
    pub name: String,
    /// Relative path under the public upload prefix, e.g. `uploads/video/...`.
    pub path: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
}

/// One news article with an optional cover image.
///
/// Older documents on disk carry `description` instead of `content` and
/// `date` instead of `createdAt`; both aliases are accepted on read and
/// normalized to the canonical names on the next write.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsRecord {
    pub id: String,
    pub title: String,
    #[serde(alias = "description")]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,
}
