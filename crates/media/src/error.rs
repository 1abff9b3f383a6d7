use std::path::PathBuf;

use thiserror::Error;

use fbharvest_core::HarvestError;
use fbharvest_storage::StorageError;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("audio download failed: {0}")]
    Download(String),

    #[error("downloader reported success but {0} is missing")]
    MissingAudio(PathBuf),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<MediaError> for HarvestError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Config(msg) => HarvestError::Config(msg),
            MediaError::Storage(e) => e.into(),
            other => HarvestError::Media(other.to_string()),
        }
    }
}

/// Core errors only reach media code while loading inputs, so they are all
/// configuration problems here.
impl From<HarvestError> for MediaError {
    fn from(e: HarvestError) -> Self {
        match e {
            HarvestError::Config(msg) => MediaError::Config(msg),
            other => MediaError::Config(other.to_string()),
        }
    }
}
