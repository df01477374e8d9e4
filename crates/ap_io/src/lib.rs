//! crates/ap_io/src/lib.rs
//! Typed I/O for the apportionment engine: election-bundle loading,
//! canonical JSON bytes, SHA-256 digests and `RES:` result ids.
//!
//! One shared error type (`IoError`) with `From` conversions; real logic
//! lives in the file modules.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for ap_io (loader/canonical_json/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, rename, fsync, etc.)
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON parse/serialize errors with a JSON-pointer-like hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Bundle content that parses but violates domain invariants.
    #[error("invalid bundle: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; default to root and
        // let callers enrich.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{res_id_from_canonical, sha256_canonical, sha256_hex};
    pub use crate::loader::{load_bundle_from_path, LoadedBundle};
}
