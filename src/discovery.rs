//! Working directory listing and rewrite target selection.
use log::*;
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use crate::{
    detection::version::DEBIAN_CHANGELOGS,
    error::{Result, SetVersionError},
    rewriter::types::TargetFile,
};

/// Names of the regular files directly inside `dir`, sorted.
pub fn list_local_files(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| SetVersionError::io(dir, e))?;

    let mut names = vec![];

    for entry in entries {
        let entry = entry.map_err(|e| SetVersionError::io(dir, e))?;
        let file_type =
            entry.file_type().map_err(|e| SetVersionError::io(entry.path(), e))?;

        if !file_type.is_file() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => {
                debug!("skipping non UTF-8 filename {}", name.to_string_lossy())
            }
        }
    }

    names.sort();

    Ok(names)
}

/// Every file in `dir` that one of the rewriters handles.
///
/// Spec files and `PKGBUILD` are only looked for at the top level. Targets
/// come back sorted by path.
pub fn discover_targets(dir: &Path) -> Result<Vec<TargetFile>> {
    let mut targets = list_local_files(dir)?
        .into_iter()
        .filter_map(TargetFile::from_path)
        .collect::<Vec<TargetFile>>();

    for changelog in DEBIAN_CHANGELOGS {
        let path = PathBuf::from(changelog);

        // top-level names were already picked up from the listing
        if !changelog.contains('/') || !dir.join(&path).is_file() {
            continue;
        }

        if let Some(target) = TargetFile::from_path(path) {
            targets.push(target);
        }
    }

    targets.sort();
    targets.dedup();

    debug!("discovered {} rewrite targets", targets.len());

    Ok(targets)
}

/// The targets to rewrite for a run.
///
/// Without `requested` files every discovered target is returned. Otherwise
/// exactly the requested files, each of which must exist and belong to a
/// known dialect.
pub fn select_targets(
    dir: &Path,
    requested: &[PathBuf],
) -> Result<Vec<TargetFile>> {
    if requested.is_empty() {
        return discover_targets(dir);
    }

    let mut targets = vec![];

    for file in requested {
        if !dir.join(file).is_file() {
            return Err(SetVersionError::RewriteTargetMissing(file.clone()));
        }

        let relative = relative_to_workdir(dir, file).ok_or_else(|| {
            SetVersionError::TargetOutsideWorkdir(file.clone())
        })?;

        let target = TargetFile::from_path(relative)
            .ok_or_else(|| SetVersionError::UnsupportedTarget(file.clone()))?;

        if !targets.contains(&target) {
            targets.push(target);
        }
    }

    Ok(targets)
}

/// `file` as a plain path below `dir`, or `None` when it points elsewhere.
fn relative_to_workdir(dir: &Path, file: &Path) -> Option<PathBuf> {
    let candidate = if file.is_absolute() {
        let dir = dir.canonicalize().ok()?;
        let file = file.canonicalize().ok()?;
        file.strip_prefix(&dir).ok()?.to_path_buf()
    } else {
        file.to_path_buf()
    };

    let mut relative = PathBuf::new();

    for component in candidate.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    (!relative.as_os_str().is_empty()).then_some(relative)
}
