use std::env;
use std::path::PathBuf;

/// Runtime configuration for the media backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port to listen on (default: 3000)
    pub port: u16,

    /// Directory holding uploaded files, served under /uploads (default: "uploads")
    pub upload_root: PathBuf,

    /// Directory holding the collection JSON documents (default: "data")
    pub data_dir: PathBuf,

    /// Maximum request body size in bytes (default: 256 MB)
    pub max_file_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            upload_root: PathBuf::from("uploads"),
            data_dir: PathBuf::from("data"),
            max_file_size: 256 * 1024 * 1024, // 256 MB
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_root: env::var("UPLOAD_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.upload_root),

            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.data_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),
        }
    }
}
