//! Conversion of Python (PEP 440) versions into strings that RPM and dpkg
//! order the same way pip does.
//!
//! The rendering relies on how both native comparators treat a `~`: it sorts
//! before everything, including the end of the string. Pre-releases and dev
//! releases are therefore introduced with `~`, while post releases continue
//! with a plain `.`. Pre-release phases carry an `x` prefix so they sort
//! after `~dev` (`x` > `d`) and stay in alpha < beta < rc order.
pub mod pep440;

use log::*;

use crate::version::pep440::{Pep440Version, PreRelease, join_release};

/// The version chosen for a run.
///
/// Computed once before any file is touched and shared read-only by every
/// rewriter, so all rewritten files carry the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunVersion {
    /// The token as given on the command line or detected from a source.
    pub raw: String,
    /// The value written to version fields.
    pub normalized: String,
}

impl RunVersion {
    /// A version that needs no conversion.
    pub fn unconverted(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            normalized: raw.clone(),
            raw,
        }
    }

    /// A Python version converted with [`normalize`].
    pub fn python(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            normalized: normalize(&raw),
            raw,
        }
    }

    /// Whether conversion produced something other than the raw token.
    pub fn is_converted(&self) -> bool {
        self.raw != self.normalized
    }
}

impl std::fmt::Display for RunVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

fn pre_release_tag(phase: PreRelease) -> &'static str {
    match phase {
        PreRelease::Alpha => "xalpha",
        PreRelease::Beta => "xbeta",
        PreRelease::Rc => "xrc",
    }
}

/// Render a parsed version in the RPM/dpkg-comparable form.
///
/// The local label is dropped: neither comparator has a segment that sorts
/// the way PEP 440 local labels do.
pub fn to_rpm_version(version: &Pep440Version) -> String {
    let mut rendered = String::new();

    if version.epoch > 0 {
        rendered.push_str(&format!("{}:", version.epoch));
    }

    rendered.push_str(&join_release(&version.release));

    if let Some((phase, number)) = version.pre {
        rendered.push_str(&format!("~{}{number}", pre_release_tag(phase)));
    }

    if let Some(post) = version.post {
        rendered.push_str(&format!(".post{post}"));
    }

    if let Some(dev) = version.dev {
        rendered.push_str(&format!("~dev{dev}"));
    }

    rendered
}

/// Convert a PEP 440 version to its RPM/dpkg form.
///
/// Strings that are not valid PEP 440 are returned unchanged.
pub fn normalize(version: &str) -> String {
    match version.parse::<Pep440Version>() {
        Ok(parsed) => {
            let rendered = to_rpm_version(&parsed);
            debug!("converted python version {version} to {rendered}");
            rendered
        }
        Err(err) => {
            warn!("{err}: using '{version}' unchanged");
            version.to_string()
        }
    }
}
