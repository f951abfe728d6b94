use log::*;
use std::path::{Component, Path};

use crate::archive::LocalArchive;

/// Packaging ecosystem of the source archives in a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PackageType {
    /// A Python sdist: versions follow PEP 440 and must be converted.
    Python,
    /// No specific ecosystem; versions are used as-is.
    #[default]
    Generic,
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageType::Python => write!(f, "python"),
            PackageType::Generic => write!(f, "generic"),
        }
    }
}

/// Classifies archive contents by ecosystem.
pub struct PackageTypeDetector {}

impl PackageTypeDetector {
    /// Classify a list of archive member paths.
    ///
    /// A `PKG-INFO` counts as Python metadata only when it sits inside a
    /// directory (an sdist root or an `*.egg-info` directory); a bare
    /// top-level `PKG-INFO` does not.
    pub fn detect<S: AsRef<str>>(member_paths: &[S]) -> PackageType {
        if member_paths
            .iter()
            .any(|path| is_python_metadata(path.as_ref()))
        {
            PackageType::Python
        } else {
            PackageType::Generic
        }
    }

    /// Classify the combined contents of every scanned archive.
    pub fn detect_archives(archives: &[LocalArchive]) -> PackageType {
        let names = archives
            .iter()
            .flat_map(|archive| archive.members.iter())
            .map(|member| member.name.as_str())
            .collect::<Vec<&str>>();

        let package_type = Self::detect(names.as_slice());
        debug!("detected package type: {package_type}");
        package_type
    }
}

fn is_python_metadata(member: &str) -> bool {
    let components = Path::new(member)
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>();

    let Some((last, parents)) = components.split_last() else {
        return false;
    };

    if *last != "PKG-INFO" {
        return false;
    }

    // covers both `<sdist>/PKG-INFO` and `*.egg-info/PKG-INFO`
    !parents.is_empty()
}
