//! Whole-file reads and writes.
//!
//! Writes go to a temporary file in the destination directory which is then
//! renamed over the target, so a failed write never leaves a truncated file.
use log::*;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::error::{Result, SetVersionError};

/// Read a whole file as UTF-8.
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SetVersionError::io(path, e))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replace `path` with `content`.
///
/// An existing file keeps its permissions; a new file takes those of
/// `permissions_from`. The temporary file is removed on every error path
/// when it goes out of scope.
pub fn write_atomic(
    path: &Path,
    content: &str,
    permissions_from: &Path,
) -> Result<()> {
    let dir = parent_dir(path);

    fs::create_dir_all(&dir).map_err(|e| SetVersionError::io(&dir, e))?;

    let mut temp =
        NamedTempFile::new_in(&dir).map_err(|e| SetVersionError::io(path, e))?;

    temp.write_all(content.as_bytes())
        .map_err(|e| SetVersionError::io(path, e))?;

    temp.as_file()
        .sync_all()
        .map_err(|e| SetVersionError::io(path, e))?;

    // the temporary file is created owner-only
    if let Ok(metadata) =
        fs::metadata(path).or_else(|_| fs::metadata(permissions_from))
    {
        fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|e| SetVersionError::io(path, e))?;
    }

    temp.persist(path)
        .map_err(|e| SetVersionError::io(path, e.error))?;

    debug!("wrote {}", path.display());

    Ok(())
}
