//! Object storage collaborator
//!
//! Event cover images and gallery photos are stored outside the database.
//! The core only needs a key/URL pair back, so storage sits behind a trait
//! and the default implementation speaks plain HTTP PUT/DELETE.

use async_trait::async_trait;
use std::time::Duration;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;
use crate::config::StorageConfig;
use crate::utils::errors::{Result, StorageError, TripBuddyError};
use crate::utils::helpers::image_extension;

/// A stored object and where clients can fetch it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: usize,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug {
    /// Store `bytes` under `key`
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<StoredObject>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &str) -> Result<()>;

    /// Public URL of `key`
    fn public_url(&self, key: &str) -> String;

    /// Recover the key from a URL previously returned by this storage
    fn key_for_url(&self, url: &str) -> Option<String>;
}

/// Storage key of an event image: `events/{event_id}/{uuid}.{ext}`
pub fn event_image_key(event_id: Uuid, content_type: &str) -> Result<String> {
    let extension = image_extension(content_type)
        .ok_or_else(|| StorageError::UnsupportedContentType(content_type.to_string()))?;
    Ok(format!("events/{}/{}.{}", event_id, Uuid::new_v4(), extension))
}

/// Reject empty or oversized uploads before any bytes leave the process
pub fn check_upload_size(size: usize, limit: usize) -> Result<()> {
    if size == 0 {
        return Err(TripBuddyError::invalid("upload is empty"));
    }
    if size > limit {
        return Err(StorageError::TooLarge { size, limit }.into());
    }
    Ok(())
}

/// S3-style storage reached over HTTP with an optional bearer token
#[derive(Clone, Debug)]
pub struct HttpObjectStorage {
    client: Client,
    config: StorageConfig,
}

impl HttpObjectStorage {
    pub fn new(config: StorageConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint)?;
        url::Url::parse(&config.public_base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    fn object_url(&self, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket,
            encoded
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<StoredObject> {
        check_upload_size(bytes.len(), self.config.max_upload_bytes)?;

        let size = bytes.len();
        let url = self.object_url(key);
        debug!(key = key, size = size, "Uploading object");

        let response = self
            .authorize(self.client.put(&url))
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::UploadRejected { status, body }.into());
        }

        info!(key = key, size = size, "Object stored");
        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
            size,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .authorize(self.client.delete(self.object_url(key)))
            .send()
            .await?;

        let status = response.status();
        // Deleting a missing object is not an error
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::DeleteRejected { status: status.as_u16() }.into());
        }

        debug!(key = key, "Object deleted");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.public_base_url.trim_end_matches('/'), key)
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        let base = format!("{}/", self.config.public_base_url.trim_end_matches('/'));
        url.strip_prefix(&base)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}
