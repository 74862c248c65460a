//! Wishlist records, kept in a JSON snapshot.

use serde::{Deserialize, Serialize};

use super::snapshot::{SnapshotRecord, SnapshotStore};

pub type WishlistStore = SnapshotStore<WishlistItem>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WishlistItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: String,
}

impl SnapshotRecord for WishlistItem {
    const KIND: &'static str = "wishlist item";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
