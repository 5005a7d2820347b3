pub mod records;

pub use records::{MediaRecord, MediaType, NewsRecord};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Public URL prefix under which uploaded files are served; record paths are
/// always expressed relative to it.
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode collection document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One JSON-document-backed collection.
///
/// The document is the single source of truth, so every mutation is a
/// read-modify-write of the whole array. The mutex serializes those cycles;
/// without it two concurrent inserts can read the same snapshot and one
/// overwrites the other's addition.
struct Collection {
    name: &'static str,
    document: PathBuf,
    lock: Mutex<()>,
}

impl Collection {
    fn new(name: &'static str, document: PathBuf) -> Self {
        Self {
            name,
            document,
            lock: Mutex::new(()),
        }
    }

    /// Reads the whole collection. An absent or unreadable document is an
    /// empty collection, never an error; the next successful persist rewrites
    /// a valid document.
    async fn load<T: DeserializeOwned>(&self) -> Vec<T> {
        let bytes = match fs::read(&self.document).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    warn!(collection = self.name, error = %e, "failed to read collection document");
                }
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    collection = self.name,
                    error = %e,
                    "collection document is not valid JSON, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Atomically replaces the document: write a sibling temp file, then
    /// rename over the old one. A failed write leaves the previous document
    /// intact; readers never observe torn JSON.
    async fn persist<T: Serialize>(&self, records: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.document.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.document.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.document).await?;

        debug!(collection = self.name, records = records.len(), "collection persisted");
        Ok(())
    }
}

/// Durable store for the two collections (gallery media and news articles)
/// and the uploaded files their records reference.
///
/// Gallery and news have independent locks, so mutations on one never block
/// the other. Not safe for multi-process deployments: the serialization is
/// in-process only.
pub struct RecordStore {
    upload_root: PathBuf,
    media: Collection,
    news: Collection,
}

impl RecordStore {
    /// Opens the store, creating the upload tree and data directory if they
    /// do not exist yet.
    pub fn open(upload_root: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let upload_root = upload_root.into();
        let data_dir = data_dir.into();

        for sub in ["image", "video", "audio", "news"] {
            std::fs::create_dir_all(upload_root.join(sub))?;
        }
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self {
            upload_root,
            media: Collection::new("gallery", data_dir.join("gallery.json")),
            news: Collection::new("news", data_dir.join("news.json")),
        })
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// All gallery records, newest first.
    pub async fn list_media(&self) -> Vec<MediaRecord> {
        self.media.load().await
    }

    /// All news records, newest first.
    pub async fn list_news(&self) -> Vec<NewsRecord> {
        self.news.load().await
    }

    /// Stores the uploaded bytes under the type-scoped subdirectory and
    /// prepends a record to the gallery collection.
    ///
    /// `name` must already be sanitized; the caller rejects empty payloads
    /// before getting here.
    pub async fn insert_media(
        &self,
        name: &str,
        bytes: &[u8],
        media_type: MediaType,
    ) -> Result<MediaRecord, StoreError> {
        let _guard = self.media.lock.lock().await;

        let mut records: Vec<MediaRecord> = self.media.load().await;

        let stored_name = stored_filename(name);
        let dir = self.upload_root.join(media_type.as_str());
        fs::create_dir_all(&dir).await?;
        let file_path = dir.join(&stored_name);
        fs::write(&file_path, bytes).await?;

        let record = MediaRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            path: format!("{PUBLIC_PREFIX}/{}/{}", media_type.as_str(), stored_name),
            media_type,
            created_at: Utc::now(),
        };

        records.insert(0, record.clone());
        if let Err(e) = self.media.persist(&records).await {
            // The document is authoritative: a file the document never
            // learned about must not survive a failed persist.
            let _ = fs::remove_file(&file_path).await;
            return Err(e);
        }

        debug!(id = %record.id, path = %record.path, "media record inserted");
        Ok(record)
    }

    /// Removes the gallery record whose `path` matches, deleting its file.
    /// The file is unlinked before the document persist, so a crash between
    /// the two leaves at worst an orphaned file, never a dangling record.
    pub async fn remove_media(&self, path: &str) -> Result<(), StoreError> {
        let _guard = self.media.lock.lock().await;

        let mut records: Vec<MediaRecord> = self.media.load().await;
        let pos = records
            .iter()
            .position(|r| r.path == path)
            .ok_or(StoreError::NotFound)?;

        self.unlink(&records[pos].path).await?;
        records.remove(pos);
        self.media.persist(&records).await?;

        debug!(path, "media record removed");
        Ok(())
    }

    /// Prepends a news record, writing the optional cover image under the
    /// news subdirectory of the upload root.
    pub async fn insert_news(
        &self,
        title: &str,
        content: &str,
        image: Option<(&str, &[u8])>,
    ) -> Result<NewsRecord, StoreError> {
        let _guard = self.news.lock.lock().await;

        let mut records: Vec<NewsRecord> = self.news.load().await;

        let mut image_path = None;
        let mut image_file = None;
        if let Some((name, bytes)) = image {
            let stored_name = stored_filename(name);
            let dir = self.upload_root.join("news");
            fs::create_dir_all(&dir).await?;
            let file_path = dir.join(&stored_name);
            fs::write(&file_path, bytes).await?;
            image_path = Some(format!("{PUBLIC_PREFIX}/news/{stored_name}"));
            image_file = Some(file_path);
        }

        let record = NewsRecord {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            image: image_path,
            created_at: Utc::now(),
        };

        records.insert(0, record.clone());
        if let Err(e) = self.news.persist(&records).await {
            if let Some(file_path) = image_file {
                let _ = fs::remove_file(&file_path).await;
            }
            return Err(e);
        }

        debug!(id = %record.id, title = %record.title, "news record inserted");
        Ok(record)
    }

    /// Removes the news record with the given id, deleting its cover image
    /// if the record has one.
    pub async fn remove_news(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.news.lock.lock().await;

        let mut records: Vec<NewsRecord> = self.news.load().await;
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(image) = records[pos].image.clone() {
            self.unlink(&image).await?;
        }
        records.remove(pos);
        self.news.persist(&records).await?;

        debug!(id, "news record removed");
        Ok(())
    }

    /// Maps a record path (`uploads/<type>/<file>`) back to a filesystem
    /// path under the upload root. Rejects anything that would escape it.
    fn resolve_relative(&self, rel: &str) -> Option<PathBuf> {
        let rest = rel.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        let candidate = Path::new(rest);
        if candidate
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.upload_root.join(candidate))
    }

    /// Deletes the file a record references. A missing file is treated as
    /// already deleted; the delete still succeeds.
    async fn unlink(&self, rel: &str) -> Result<(), StoreError> {
        let Some(abs) = self.resolve_relative(rel) else {
            warn!(path = rel, "record path does not resolve under the upload root, skipping file delete");
            return Ok(());
        };

        match fs::remove_file(&abs).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = rel, "referenced file already gone");
                Ok(())
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Collision-resistant stored filename: millisecond timestamp plus the
/// sanitized original name, same scheme for every collection.
fn stored_filename(name: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), name)
}
