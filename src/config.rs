use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Top-level configuration, loaded once at startup and passed by reference
/// into each component's constructor.
///
/// The `[duplicates]` section is deliberately required and has no defaults:
/// a zero threshold or limit makes the duplicate gate either always-triggered
/// or inert, so both values must be stated explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub object_store: ObjectStoreConfig,

    #[serde(default)]
    pub snowflake: SnowflakeConfig,

    pub duplicates: DuplicateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_listen() -> String {
    "0.0.0.0:9080".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("hearth")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    default_data_dir().join("hearth.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStoreBackend {
    /// In-process blob map. Useful for development; contents do not survive
    /// a restart.
    #[default]
    Memory,
    /// S3-compatible HTTP endpoint (e.g. MinIO).
    S3,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ObjectStoreConfig {
    #[serde(default)]
    pub backend: ObjectStoreBackend,

    /// Host (and optional port) of the S3-compatible endpoint.
    #[serde(default)]
    pub endpoint: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default)]
    pub use_ssl: bool,
}

fn default_bucket() -> String {
    "photodump".to_string()
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default = "default_snowflake_id")]
    pub node: u64,

    #[serde(default = "default_snowflake_id")]
    pub worker: u64,
}

fn default_snowflake_id() -> u64 {
    1
}

impl Default for SnowflakeConfig {
    fn default() -> Self {
        Self { node: 1, worker: 1 }
    }
}

/// Duplicate gate tuning. `max_distance` is the Hamming distance (in bits,
/// over the 64-bit perceptual hash) under which two photos count as similar;
/// `limit` is how many similar photos may already exist before an upload is
/// rejected as a duplicate.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DuplicateConfig {
    pub max_distance: u32,
    pub limit: u64,
}

impl Config {
    /// Default config file location: `~/.config/hearth/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("hearth")
            .join("config.toml")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("could not read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("could not parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.duplicates.max_distance == 0 || self.duplicates.max_distance > 64 {
            return Err(Error::Config(format!(
                "duplicates.max_distance must be between 1 and 64, got {}",
                self.duplicates.max_distance
            )));
        }
        if self.duplicates.limit == 0 {
            return Err(Error::Config(
                "duplicates.limit must be at least 1".to_string(),
            ));
        }
        if self.object_store.backend == ObjectStoreBackend::S3 && self.object_store.endpoint.is_empty()
        {
            return Err(Error::Config(
                "object_store.endpoint is required for the s3 backend".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config(duplicates: &str) -> String {
        format!(
            r#"
            [server]
            listen = "127.0.0.1:0"

            [duplicates]
            {duplicates}
            "#
        )
    }

    #[test]
    fn parses_minimal_config() {
        let config: Config =
            toml::from_str(&base_config("max_distance = 8\nlimit = 1")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.duplicates.max_distance, 8);
        assert_eq!(config.duplicates.limit, 1);
        assert_eq!(config.object_store.backend, ObjectStoreBackend::Memory);
        assert_eq!(config.snowflake.node, 1);
    }

    #[test]
    fn rejects_missing_duplicates_section() {
        let result: std::result::Result<Config, _> = toml::from_str("[server]\n");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_zero_gate_values() {
        let config: Config =
            toml::from_str(&base_config("max_distance = 0\nlimit = 1")).unwrap();
        assert!(config.validate().is_err());

        let config: Config =
            toml::from_str(&base_config("max_distance = 8\nlimit = 0")).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_backend_requires_endpoint() {
        let config: Config = toml::from_str(
            r#"
            [object_store]
            backend = "s3"

            [duplicates]
            max_distance = 8
            limit = 1
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
