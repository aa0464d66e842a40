use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = MediaError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid root: {path}")]
    InvalidRoot { path: String },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Video error for {path}: {message}")]
    Video { path: PathBuf, message: String },

    #[error("Failed to move {from} → {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create quarantine directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected hash length: {bytes} bytes")]
    HashLength { bytes: usize },
}

impl MediaError {
    pub(crate) fn video(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        MediaError::Video {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors that must abort the whole run rather than one item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MediaError::InvalidRoot { .. } | MediaError::DirectoryCreate { .. }
        )
    }
}
