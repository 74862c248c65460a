//! Record persistence.
//!
//! Two backing technologies behind the same per-domain CRUD contract: SQLite
//! rows for photos and family-tree people, whole-file JSON snapshots for the
//! wool catalogue and the wishlist. Stores are plain concrete types selected
//! at composition time.

pub mod people;
pub mod photos;
pub mod snapshot;
pub mod wishlist;
pub mod wool;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use people::PersonStore;
use photos::PhotoStore;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id          TEXT PRIMARY KEY,
    file        TEXT NOT NULL,
    ext         TEXT NOT NULL,
    hash        TEXT NOT NULL,
    phash       BLOB NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    resolution  TEXT NOT NULL,
    taken_at    TEXT NOT NULL,
    uploaded_at TEXT NOT NULL,
    modified_at TEXT NOT NULL,
    people      TEXT NOT NULL DEFAULT '[]',
    tags        TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_photos_hash ON photos(hash);

CREATE TABLE IF NOT EXISTS people (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    middle_names  TEXT NOT NULL DEFAULT '[]',
    surname       TEXT,
    nicknames     TEXT NOT NULL DEFAULT '[]',
    sex           TEXT,
    gender        TEXT,
    pronouns      TEXT,
    dob           INTEGER,
    dod           INTEGER,
    parents       TEXT NOT NULL DEFAULT '[]',
    step_parents  TEXT NOT NULL DEFAULT '[]',
    guardians     TEXT NOT NULL DEFAULT '[]',
    is_adopted    INTEGER NOT NULL DEFAULT 0,
    partner       TEXT,
    prev_partners TEXT NOT NULL DEFAULT '[]'
);
"#;

/// Handle on the relational database. Cheap to clone into per-domain stores;
/// the single connection is serialized behind a mutex.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn initialize(&self) -> Result<()> {
        self.conn
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn photos(&self) -> PhotoStore {
        PhotoStore::new(Arc::clone(&self.conn))
    }

    pub fn people(&self) -> PersonStore {
        PersonStore::new(Arc::clone(&self.conn))
    }
}
