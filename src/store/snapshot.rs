//! File-backed JSON snapshot store.
//!
//! The whole record set lives in one JSON array file which is rewritten on
//! every mutation (temp file + atomic rename). A mutex serializes the
//! read-modify-rewrite cycle within this process; the file itself is still a
//! single-writer resource and is not safe against concurrent mutation from
//! other processes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

/// A record storable in a JSON snapshot.
pub trait SnapshotRecord: Serialize + DeserializeOwned + Clone + Send + 'static {
    /// Human-readable domain name, used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

pub struct SnapshotStore<T> {
    path: PathBuf,
    items: Mutex<Vec<T>>,
}

impl<T: SnapshotRecord> SnapshotStore<T> {
    /// Open a store, loading the existing snapshot if there is one.
    pub fn open(path: PathBuf) -> Result<Self> {
        let items = match std::fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                Error::Internal(format!("corrupt snapshot {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Rewrite the snapshot in place: write a sibling temp file, then rename
    /// over the original so readers never observe a half-written file.
    fn save(&self, items: &[T]) -> Result<()> {
        let raw = serde_json::to_vec_pretty(items)
            .map_err(|e| Error::Internal(format!("could not encode snapshot: {}", e)))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn not_found() -> Error {
        Error::NotFound(format!("{} not found", T::KIND))
    }

    pub fn get(&self, id: &str) -> Result<T> {
        self.lock()
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    /// The identifier must be freshly assigned before this call.
    pub fn create(&self, item: T) -> Result<()> {
        let mut items = self.lock();
        items.push(item);
        self.save(&items)
    }

    pub fn update(&self, item: T) -> Result<()> {
        let mut items = self.lock();
        match items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => return Err(Self::not_found()),
        }
        self.save(&items)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut items = self.lock();
        match items.iter().position(|item| item.id() == id) {
            Some(idx) => {
                items.remove(idx);
            }
            None => return Err(Self::not_found()),
        }
        self.save(&items)
    }

    pub fn list(&self, amount: usize, cursor: usize) -> Result<Vec<T>> {
        let items = self.lock();
        if cursor > 0 && cursor >= items.len() {
            return Err(Error::InvalidInput("invalid cursor".to_string()));
        }
        Ok(items.iter().skip(cursor).take(amount).cloned().collect())
    }
}
