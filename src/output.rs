//! Putting the encoded export on disk.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{ExportError, Result};

/// Strategy for replacing the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Write a temporary file next to the target, then rename it over the
    /// target. Readers never observe a partial file.
    #[default]
    Atomic,
    /// Truncate the target and write into it directly.
    Truncate,
}

/// Write `bytes` to `path`, returning the number of bytes written.
pub fn write_output(path: &Path, bytes: &[u8], mode: WriteMode) -> Result<u64> {
    match mode {
        WriteMode::Atomic => write_atomic(path, bytes)?,
        WriteMode::Truncate => write_truncate(path, bytes)?,
    }
    Ok(bytes.len() as u64)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // The temp file is deleted on drop, so every early return cleans up.
    let mut tmp = new_temp_file(dir).map_err(|e| ExportError::write(path, e))?;
    // Replacing a file keeps its mode.
    if let Some(existing) = std::fs::metadata(path).ok().filter(|m| m.is_file()) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| ExportError::write(path, e))?;
    }
    tmp.write_all(bytes).map_err(|e| ExportError::write(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ExportError::write(path, e))?;
    tmp.persist(path)
        .map_err(|e| ExportError::write(path, e.error))?;
    Ok(())
}

/// A temp file in `dir` created with the mode `File::create` would use
/// (0o666 less the umask) instead of tempfile's owner-only default.
#[cfg(unix)]
fn new_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn new_temp_file(dir: &Path) -> io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

fn write_truncate(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| ExportError::write(path, e))?;
    file.write_all(bytes).map_err(|e| ExportError::write(path, e))?;
    file.sync_all().map_err(|e| ExportError::write(path, e))?;
    Ok(())
}
