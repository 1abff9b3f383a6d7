use thiserror::Error;

use fbharvest_core::HarvestError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("upload response has no file id")]
    MissingId,
}

impl From<StorageError> for HarvestError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Config(msg) => HarvestError::Config(msg),
            other => HarvestError::Storage(other.to_string()),
        }
    }
}
