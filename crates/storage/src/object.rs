use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::StorageError;

/// A file accepted by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub id: String,
    pub bucket_id: String,
    pub name: String,
}

/// Remote object storage for finished output files.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads the file under a server-generated id.
    async fn upload(&self, path: &Path) -> Result<StoredObject, StorageError>;
}
