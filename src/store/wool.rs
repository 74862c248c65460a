//! Wool / craft-supply catalogue records, kept in a JSON snapshot.

use serde::{Deserialize, Serialize};

use super::snapshot::{SnapshotRecord, SnapshotStore};

pub type WoolStore = SnapshotStore<Wool>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Wool {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub ply: u32,
    #[serde(default)]
    pub needle_size: String,
    #[serde(default)]
    pub colour: String,
    #[serde(default)]
    pub composition: String,
    #[serde(default)]
    pub quantity: u32,
    /// Remaining fraction of a partially used ball, in percent.
    #[serde(default)]
    pub partial: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SnapshotRecord for Wool {
    const KIND: &'static str = "wool";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
