//! File system capabilities.
//!
//! Plain synchronous std::fs calls, registered through `BlockingCapability`.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use super::{BlockingCapability, Capability};
use crate::error::CapabilityError;
use crate::types::Args;

pub const MODULE: &str = "file_system";

/// Files larger than this are refused by `read_file`.
const MAX_READ_BYTES: u64 = 1024 * 1024;

pub(crate) fn capabilities() -> Vec<(&'static str, Arc<dyn Capability>)> {
    let read: Arc<dyn Capability> = Arc::new(BlockingCapability::new(read_file));
    let list: Arc<dyn Capability> = Arc::new(BlockingCapability::new(list_files));
    vec![("read_file", read), ("list_files", list)]
}

fn required_str<'a>(args: &'a Args, key: &str) -> Result<&'a str, CapabilityError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CapabilityError::InvalidArgs(format!("'{}' must be a non-empty string", key)))
}

/// Read a UTF-8 text file. Returns `{success, text, path}`.
pub fn read_file(args: Args) -> Result<Value, CapabilityError> {
    let path = Path::new(required_str(&args, "path")?);
    if !path.is_file() {
        return Ok(json!({
            "success": false,
            "error": format!("File not found: {}", path.display()),
        }));
    }

    let size = std::fs::metadata(path)?.len();
    if size > MAX_READ_BYTES {
        return Ok(json!({
            "success": false,
            "error": format!("File too large to read: {} bytes", size),
        }));
    }

    let text = std::fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), bytes = size, "File read");
    Ok(json!({ "success": true, "text": text, "path": path.display().to_string() }))
}

/// List the entries of a directory, sorted by name.
///
/// Returns `{success, files, text}` where `text` is one name per line.
pub fn list_files(args: Args) -> Result<Value, CapabilityError> {
    let dir = Path::new(required_str(&args, "path")?);
    if !dir.is_dir() {
        return Ok(json!({
            "success": false,
            "error": format!("Folder not found: {}", dir.display()),
        }));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    let text = if names.is_empty() {
        format!("{} is empty", dir.display())
    } else {
        names.join("\n")
    };
    Ok(json!({ "success": true, "files": names, "text": text }))
}
