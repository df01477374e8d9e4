//! Deterministic hashing and result-id building.
//!
//! - Hashing goes over **canonical** JSON bytes (sorted keys, compact), so
//!   field order in memory never changes an id.
//! - Digests are lowercase hex; result ids are `RES:<hex64>`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use ap_core::ids::ResultId;
use core::str::FromStr;

use crate::canonical_json::to_canonical_bytes;
use crate::{IoError, IoResult};

/// SHA-256 over raw bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// SHA-256 over a file's raw bytes (input digests for the audit record).
pub fn sha256_file(path: &Path) -> IoResult<String> {
    let f = File::open(path)?;
    let mut r = BufReader::new(f);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 256 * 1024];
    loop {
        let n = r.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// `RES:<hex>` id of a result document, derived from canonical bytes.
pub fn res_id_from_canonical<T: Serialize>(value: &T) -> IoResult<ResultId> {
    let hex = sha256_canonical(value)?;
    ResultId::from_str(&format!("RES:{hex}"))
        .map_err(|e| IoError::Invalid(format!("result id: {e}")))
}
