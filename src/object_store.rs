//! Blob storage for uploaded photos.
//!
//! Two backends: an S3-compatible HTTP endpoint (MinIO in the reference
//! deployment, with an anonymous-write bucket policy — request signing is
//! deliberately not implemented here) and an in-process map for development
//! and tests. Both return a retrievable URL for the stored blob.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::{ObjectStoreBackend, ObjectStoreConfig};
use crate::error::{Error, Result};

pub enum ObjectStore {
    S3(S3Store),
    Memory(MemoryStore),
}

impl ObjectStore {
    pub fn from_config(config: &ObjectStoreConfig) -> Self {
        match config.backend {
            ObjectStoreBackend::S3 => ObjectStore::S3(S3Store::new(config)),
            ObjectStoreBackend::Memory => ObjectStore::Memory(MemoryStore::new()),
        }
    }

    /// Upload a blob under `key`, returning its retrieval URL.
    pub async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        match self {
            ObjectStore::S3(s3) => s3.put(key, bytes, content_type).await,
            ObjectStore::Memory(mem) => mem.put(key, bytes),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        match self {
            ObjectStore::S3(s3) => s3.delete(key).await,
            ObjectStore::Memory(mem) => mem.delete(key),
        }
    }
}

pub struct S3Store {
    client: reqwest::Client,
    base_url: String,
}

impl S3Store {
    pub fn new(config: &ObjectStoreConfig) -> Self {
        let scheme = if config.use_ssl { "https" } else { "http" };
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}://{}/{}", scheme, config.endpoint, config.bucket),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = self.object_url(key);
        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "object store upload failed");
                Error::ObjectStore("could not upload file".to_string())
            })?;

        if !response.status().is_success() {
            tracing::error!(key, status = %response.status(), "object store rejected upload");
            return Err(Error::ObjectStore("could not upload file".to_string()));
        }
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let url = self.object_url(key);
        let response = self.client.delete(&url).send().await.map_err(|e| {
            tracing::error!(key, error = %e, "object store delete failed");
            Error::ObjectStore("could not delete file".to_string())
        })?;

        // A missing object is already the state we want.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            tracing::error!(key, status = %response.status(), "object store rejected delete");
            return Err(Error::ObjectStore("could not delete file".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    #[cfg(test)]
    fail_deletes: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String> {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), bytes);
        Ok(format!("memory://{}", key))
    }

    fn delete(&self, key: &str) -> Result<()> {
        #[cfg(test)]
        if self.fail_deletes.load(std::sync::atomic::Ordering::Relaxed) {
            return Err(Error::ObjectStore("could not delete file".to_string()));
        }
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }

    /// Make every subsequent delete fail, to exercise compensation paths.
    #[cfg(test)]
    pub fn poison_deletes(&self) {
        self.fail_deletes
            .store(true, std::sync::atomic::Ordering::Relaxed);
    }
}
