//! Canonical JSON (the hashing substrate for result ids and input digests).
//!
//! - Objects: keys sorted lexicographically (UTF-8 codepoint order)
//! - Arrays: order preserved (callers keep their own stable ordering)
//! - Output: compact, no trailing newline
//! - Atomic write: temp file in the same dir + fsync(temp) + rename, with a
//!   direct-write fallback for cross-device renames; fsync(dir) on Unix.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::{IoError, IoResult};

/// Canonical JSON bytes of any serializable value.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> IoResult<Vec<u8>> {
    let v = serde_json::to_value(value)?;
    Ok(value_to_bytes(&v))
}

/// Canonical JSON bytes of an already-parsed `Value`.
pub fn value_to_bytes(v: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(1024);
    write_value(v, &mut out);
    out
}

/// Write a value to `path` as canonical JSON, atomically.
pub fn write_canonical_file<T: Serialize>(path: &Path, value: &T) -> IoResult<()> {
    let bytes = to_canonical_bytes(value)?;
    write_bytes_atomic(path, &bytes)
}

/// Write arbitrary bytes to `path` atomically (shared by pretty output too).
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> IoResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| IoError::Path("path has no parent".into()))?;
    fs::create_dir_all(parent)?;

    // Unique temp next to the destination, so rename stays on one filesystem.
    let tmp = unique_tmp_path(path);
    let mut tf = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
    tf.write_all(bytes)?;
    tf.sync_all()?;
    drop(tf);

    match fs::rename(&tmp, path) {
        Ok(()) => {
            let _ = fsync_dir(parent);
            Ok(())
        }
        Err(_) => {
            // Cross-device fallback: write the target directly.
            let direct = (|| -> std::io::Result<()> {
                let mut f = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
                f.write_all(bytes)?;
                f.sync_all()
            })();
            let _ = fs::remove_file(&tmp);
            direct?;
            let _ = fsync_dir(parent);
            Ok(())
        }
    }
}

fn write_value(v: &Value, out: &mut Vec<u8>) {
    match v {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => write_escaped(s, out),
        Value::Array(arr) => {
            out.push(b'[');
            for (i, elem) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(elem, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            let mut keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
            keys.sort_unstable();
            for (i, k) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_escaped(k, out);
                out.push(b':');
                write_value(&map[*k], out);
            }
            out.push(b'}');
        }
    }
}

fn write_escaped(s: &str, out: &mut Vec<u8>) {
    // serde_json produces a correctly escaped JSON string literal.
    match serde_json::to_string(s) {
        Ok(quoted) => out.extend_from_slice(quoted.as_bytes()),
        Err(_) => out.extend_from_slice(b"\"\""), // unreachable for &str
    }
}

/// "<filename>.<pid>.<counter>.tmp" next to the target.
fn unique_tmp_path(target: &Path) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    let tmp_name = format!("{fname}.{pid}.{n}.tmp");
    match target.parent() {
        Some(dir) => dir.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> std::io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

#[cfg(not(unix))]
#[inline]
fn fsync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}
