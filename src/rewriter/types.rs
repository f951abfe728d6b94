use std::path::{Path, PathBuf};

use crate::detection::version::DEBIAN_CHANGELOGS;

/// Metadata file formats whose version can be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dialect {
    /// RPM `*.spec` file
    Spec,
    /// Arch Linux `PKGBUILD`
    Pkgbuild,
    /// `debian.changelog` or `debian/changelog`
    DebianChangelog,
}

impl Dialect {
    /// Select the dialect from a path relative to the working directory.
    pub fn from_path(path: &Path) -> Option<Self> {
        let relative = path.to_string_lossy().replace('\\', "/");
        let relative = relative.strip_prefix("./").unwrap_or(&relative);

        if DEBIAN_CHANGELOGS.contains(&relative) {
            return Some(Dialect::DebianChangelog);
        }

        let filename = path.file_name()?.to_string_lossy();

        if filename == "PKGBUILD" {
            Some(Dialect::Pkgbuild)
        } else if filename.ends_with(".spec") && filename.len() > ".spec".len()
        {
            Some(Dialect::Spec)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Spec => write!(f, "spec"),
            Dialect::Pkgbuild => write!(f, "pkgbuild"),
            Dialect::DebianChangelog => write!(f, "debian-changelog"),
        }
    }
}

/// A metadata file to rewrite.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TargetFile {
    /// Path relative to the working directory.
    pub path: PathBuf,
    pub dialect: Dialect,
}

impl TargetFile {
    /// Build a target when `path` belongs to a known dialect.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let dialect = Dialect::from_path(&path)?;
        Some(Self { path, dialect })
    }
}
