//! Destination writing
//!
//! Writes a downloaded payload to its rendered destination path, creating
//! parent directories as needed. The overwrite policy is identical for
//! single images and album entries: with overwrite disabled, an existing
//! destination (or any stat failure other than "not found") is a skip.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Result of a write attempt
#[derive(Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Payload written to this path
    Written(PathBuf),

    /// Destination already exists and overwrite is disabled
    SkippedExisting(PathBuf),
}

/// Writes `data` to `rendered`, resolved against `root` when relative
pub fn write_payload(
    rendered: &str,
    data: &[u8],
    root: &Path,
    overwrite: bool,
) -> io::Result<WriteOutcome> {
    let rendered = Path::new(rendered);
    let path = if rendered.is_absolute() {
        rendered.to_path_buf()
    } else {
        root.join(rendered)
    };

    if !overwrite {
        match fs::metadata(&path) {
            Ok(_) => return Ok(WriteOutcome::SkippedExisting(path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            // A probe failure gives no confidence the destination is free
            Err(_) => return Ok(WriteOutcome::SkippedExisting(path)),
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, data)?;

    Ok(WriteOutcome::Written(path))
}
