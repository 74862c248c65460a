//! Personal home-management backend: CRUD over a handful of domestic record
//! types, plus a photo-upload pipeline with perceptual-hash duplicate
//! detection and object storage.

pub mod api;
pub mod config;
pub mod error;
pub mod id;
pub mod ingest;
pub mod logging;
pub mod object_store;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
