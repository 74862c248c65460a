//! Photo upload pipeline and photo service operations.
//!
//! The upload sequences identifier assignment, image analysis, the
//! duplicate gate, metadata enrichment, the object-store upload and the
//! database insert, with a compensating blob delete when the insert fails.
//! No step is retried; every failure is terminal for the request and is
//! classified as client- or server-caused for the handler layer.

pub mod analyzer;
pub mod metadata;

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::config::DuplicateConfig;
use crate::error::{Error, Result};
use crate::id::SnowflakeGenerator;
use crate::object_store::ObjectStore;
use crate::store::photos::{Photo, PhotoStore};

/// A decoded upload request: the raw file bytes plus the user-supplied
/// descriptive fields from the multipart form.
#[derive(Debug, Default)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub description: String,
    pub people: Vec<String>,
    pub tags: Vec<String>,
}

/// User-editable photo fields. Absent fields are left unchanged; hashes,
/// storage locator, resolution and the upload timestamp are immutable.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoEdit {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub people: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct PhotoService {
    ids: Arc<SnowflakeGenerator>,
    photos: PhotoStore,
    blobs: Arc<ObjectStore>,
    gate: DuplicateConfig,
}

impl PhotoService {
    pub fn new(
        ids: Arc<SnowflakeGenerator>,
        photos: PhotoStore,
        blobs: Arc<ObjectStore>,
        gate: DuplicateConfig,
    ) -> Self {
        Self {
            ids,
            photos,
            blobs,
            gate,
        }
    }

    /// Run the upload pipeline. On success the photo is visible in both the
    /// object store and the database; on failure the pipeline drives toward
    /// neither existing, and reports [`Error::Inconsistent`] when it cannot.
    pub async fn upload(&self, request: UploadRequest) -> Result<Photo> {
        if request.bytes.is_empty() {
            return Err(Error::InvalidInput("file is empty".to_string()));
        }
        let id = self.ids.next_id();

        let analysis = analyzer::analyze(&request.bytes)?;

        let similar = self
            .photos
            .count_similar(&analysis.phash, self.gate.max_distance)?;
        if similar >= self.gate.limit {
            tracing::info!(id, similar, "rejecting upload as duplicate");
            return Err(Error::Duplicate);
        }

        // Best-effort: a missing or unreadable EXIF block never fails the
        // upload, the capture time just falls back to the upload time.
        let uploaded_at = Utc::now();
        let taken_at = metadata::capture_timestamp(&request.bytes)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .unwrap_or(uploaded_at);

        let key = format!("{}.{}", id, analysis.ext);
        let file = self
            .blobs
            .put(&key, request.bytes, analysis.content_type)
            .await?;

        let photo = Photo {
            id,
            file,
            ext: analysis.ext.to_string(),
            hash: analysis.content_hash,
            phash: analysis.phash,
            description: request.description,
            resolution: analysis.resolution,
            taken_at,
            uploaded_at,
            modified_at: uploaded_at,
            people: request.people,
            tags: request.tags,
        };

        if let Err(insert_err) = self.photos.create(&photo) {
            tracing::error!(id = photo.id, error = %insert_err, "photo insert failed, rolling back blob");
            return match self.blobs.delete(&key).await {
                Ok(()) => Err(insert_err),
                Err(delete_err) => {
                    tracing::error!(key, error = %delete_err, "compensating delete failed, blob is orphaned");
                    Err(Error::Inconsistent(format!("blob {} is orphaned", key)))
                }
            };
        }

        tracing::info!(id = photo.id, "photo {} created successfully", photo.id);
        Ok(photo)
    }

    pub fn get(&self, id: &str) -> Result<Photo> {
        self.photos.get(id)
    }

    pub fn get_by_hash(&self, hash: &str) -> Result<Photo> {
        self.photos.get_by_hash(hash)
    }

    pub fn list(&self, amount: usize, cursor: usize) -> Result<Vec<Photo>> {
        self.photos.list(amount, cursor)
    }

    /// Rewrite the user-editable fields and refresh the modification time.
    pub fn edit(&self, edit: PhotoEdit) -> Result<Photo> {
        let mut photo = self.photos.get(&edit.id)?;
        if let Some(description) = edit.description {
            photo.description = description;
        }
        if let Some(people) = edit.people {
            photo.people = people;
        }
        if let Some(tags) = edit.tags {
            photo.tags = tags;
        }
        photo.modified_at = Utc::now();
        self.photos.update(&photo)?;
        Ok(photo)
    }

    /// Delete a photo, gated on a confirmation token equal to its content
    /// hash. The blob is removed before the database row.
    pub async fn delete(&self, id: &str, confirm: &str) -> Result<()> {
        let photo = self.photos.get(id)?;
        if photo.hash != confirm {
            return Err(Error::InvalidInput(
                "confirmation hash does not match photo hash".to_string(),
            ));
        }

        let key = format!("{}.{}", photo.id, photo.ext);
        self.blobs.delete(&key).await?;
        self.photos.delete(id)?;
        tracing::info!(id, "photo {} deleted successfully", id);
        Ok(())
    }
}
