//! SQLite-backed photo store, including the perceptual-hash similarity query
//! used as the upload duplicate gate.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::ingest::analyzer::hamming_distance;

/// A stored photo. The identifier is generator-assigned and immutable; the
/// content hash is a deterministic digest of the uploaded bytes and doubles
/// as the delete-confirmation token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub id: String,
    /// Retrieval URL into the object store.
    pub file: String,
    pub ext: String,
    /// Hex-encoded SHA-256 of the raw upload.
    pub hash: String,
    /// 64-bit perceptual hash, base64 on the wire.
    #[serde(with = "phash_encoding")]
    pub phash: Vec<u8>,
    #[serde(default)]
    pub description: String,
    pub resolution: String,
    pub taken_at: DateTime<Utc>,
    pub uploaded_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Serialize the perceptual hash as standard base64, matching how byte
/// arrays appeared on the wire historically.
mod phash_encoding {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        STANDARD
            .decode(raw.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Clone)]
pub struct PhotoStore {
    conn: Arc<Mutex<Connection>>,
}

impl PhotoStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: &str) -> Result<Photo> {
        let conn = self.conn();
        let photo = conn
            .query_row(
                &format!("SELECT {} FROM photos WHERE id = ?", COLUMNS),
                [id],
                photo_from_row,
            )
            .optional()?;
        photo.ok_or_else(|| Error::NotFound("photo does not exist".to_string()))
    }

    pub fn get_by_hash(&self, hash: &str) -> Result<Photo> {
        let conn = self.conn();
        let photo = conn
            .query_row(
                &format!("SELECT {} FROM photos WHERE hash = ?", COLUMNS),
                [hash],
                photo_from_row,
            )
            .optional()?;
        photo.ok_or_else(|| Error::NotFound("photo does not exist".to_string()))
    }

    /// Count stored photos whose perceptual hash is within `max_distance`
    /// bits of the given hash. SQLite has no popcount over blobs, so the
    /// distances are computed application-side over the stored hashes.
    pub fn count_similar(&self, phash: &[u8], max_distance: u32) -> Result<u64> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT phash FROM photos")?;
        let mut count = 0u64;
        let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;
        for stored in rows {
            if hamming_distance(phash, &stored?) <= max_distance {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn create(&self, photo: &Photo) -> Result<()> {
        self.conn().execute(
            "INSERT INTO photos
             (id, file, ext, hash, phash, description, resolution,
              taken_at, uploaded_at, modified_at, people, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                photo.id,
                photo.file,
                photo.ext,
                photo.hash,
                photo.phash,
                photo.description,
                photo.resolution,
                photo.taken_at.to_rfc3339(),
                photo.uploaded_at.to_rfc3339(),
                photo.modified_at.to_rfc3339(),
                encode_list(&photo.people),
                encode_list(&photo.tags),
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, photo: &Photo) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE photos SET
             file = ?2, ext = ?3, hash = ?4, phash = ?5, description = ?6,
             resolution = ?7, taken_at = ?8, uploaded_at = ?9, modified_at = ?10,
             people = ?11, tags = ?12
             WHERE id = ?1",
            params![
                photo.id,
                photo.file,
                photo.ext,
                photo.hash,
                photo.phash,
                photo.description,
                photo.resolution,
                photo.taken_at.to_rfc3339(),
                photo.uploaded_at.to_rfc3339(),
                photo.modified_at.to_rfc3339(),
                encode_list(&photo.people),
                encode_list(&photo.tags),
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound("photo does not exist".to_string()));
        }
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM photos WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(Error::NotFound("photo does not exist".to_string()));
        }
        Ok(())
    }

    pub fn list(&self, amount: usize, cursor: usize) -> Result<Vec<Photo>> {
        let conn = self.conn();
        let total: usize =
            conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        if cursor > 0 && cursor >= total {
            return Err(Error::InvalidInput("invalid cursor".to_string()));
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM photos ORDER BY CAST(id AS INTEGER) LIMIT ?1 OFFSET ?2",
            COLUMNS
        ))?;
        let rows = stmt.query_map(params![amount, cursor], photo_from_row)?;
        let mut photos = Vec::new();
        for photo in rows {
            photos.push(photo?);
        }
        Ok(photos)
    }
}

const COLUMNS: &str = "id, file, ext, hash, phash, description, resolution, \
                       taken_at, uploaded_at, modified_at, people, tags";

fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<Photo> {
    Ok(Photo {
        id: row.get(0)?,
        file: row.get(1)?,
        ext: row.get(2)?,
        hash: row.get(3)?,
        phash: row.get(4)?,
        description: row.get(5)?,
        resolution: row.get(6)?,
        taken_at: decode_timestamp(7, row.get(7)?)?,
        uploaded_at: decode_timestamp(8, row.get(8)?)?,
        modified_at: decode_timestamp(9, row.get(9)?)?,
        people: decode_list(10, row.get(10)?)?,
        tags: decode_list(11, row.get(11)?)?,
    })
}

fn decode_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn decode_list(idx: usize, raw: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
