//! Error taxonomy for the service layer.
//!
//! Library-level failures (image decoding, SQLite, object store transport)
//! are caught at component boundaries and reclassified into this taxonomy
//! before they reach a handler. The HTTP mapping lives in `api::problem`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unusable client input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The uploaded bytes are not one of the accepted image formats.
    #[error("unsupported image type: {0}")]
    UnsupportedMedia(String),

    /// Requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A visually similar photo is already stored.
    #[error("duplicate image")]
    Duplicate,

    /// Database operation error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Object store upload/delete failure.
    #[error("object store error: {0}")]
    ObjectStore(String),

    /// The compensating blob delete after a failed insert did not succeed.
    /// The object store now holds a blob with no matching record.
    #[error("could not roll back object store write: {0}")]
    Inconsistent(String),

    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O operation error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else that is the server's fault.
    #[error("internal error: {0}")]
    Internal(String),
}
