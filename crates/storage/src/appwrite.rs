use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::info;

use fbharvest_core::config::StorageConfig;

use crate::error::StorageError;
use crate::object::{ObjectStorage, StoredObject};

/// Appwrite Storage bucket reached through its REST API.
pub struct AppwriteStorage {
    client: reqwest::Client,
    config: StorageConfig,
}

impl AppwriteStorage {
    /// Fails before any network activity when a setting is missing.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        config
            .validate()
            .map_err(|e| StorageError::Config(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn files_url(&self) -> String {
        format!(
            "{}/storage/buckets/{}/files",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket_id
        )
    }
}

#[async_trait]
impl ObjectStorage for AppwriteStorage {
    async fn upload(&self, path: &Path) -> Result<StoredObject, StorageError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.json".to_string());
        let bytes = tokio::fs::read(path).await?;

        info!("uploading {} to bucket {}", name, self.config.bucket_id);

        let part = Part::bytes(bytes)
            .file_name(name.clone())
            .mime_str(mime_for(&name))?;
        let form = Form::new().text("fileId", "unique()").part("file", part);

        let response = self
            .client
            .post(self.files_url())
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Key", &self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response.json().await?;
        let stored = parse_created(&body, &self.config.bucket_id, &name)?;
        info!("stored {} with id {}", stored.name, stored.id);
        Ok(stored)
    }
}

fn mime_for(name: &str) -> &'static str {
    if name.ends_with(".json") {
        "application/json"
    } else if name.ends_with(".jsonl") {
        "application/x-ndjson"
    } else if name.ends_with(".txt") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

fn parse_created(
    body: &serde_json::Value,
    bucket_id: &str,
    fallback_name: &str,
) -> Result<StoredObject, StorageError> {
    let id = body["$id"].as_str().ok_or(StorageError::MissingId)?;
    Ok(StoredObject {
        id: id.to_string(),
        bucket_id: body["bucketId"].as_str().unwrap_or(bucket_id).to_string(),
        name: body["name"].as_str().unwrap_or(fallback_name).to_string(),
    })
}
