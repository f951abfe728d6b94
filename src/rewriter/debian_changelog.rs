//! Debian changelog rewriting.
//!
//! A changelog is never edited as text: a new entry is added by an external
//! tool (`dch` from devscripts by default), and only when the top entry does
//! not already carry the requested version.
use log::*;
use std::{fs, path::Path, process::Command};

use crate::{
    detection::version::changelog_version,
    error::{Result, SetVersionError},
    rewriter::traits::FileRewriter,
    version::RunVersion,
    writer,
};

/// Program used to add changelog entries.
pub const DEFAULT_CHANGELOG_TOOL: &str = "dch";

/// Entry text; `{version}` is replaced by the new version.
pub const DEFAULT_CHANGELOG_MESSAGE: &str = "Update to version {version}";

/// Adds a new top entry to a Debian changelog.
#[cfg_attr(test, mockall::automock)]
pub trait ChangelogTool {
    /// Add an entry for `version` at the top of the changelog at `path`.
    fn new_version(&self, path: &Path, version: &str) -> Result<()>;
}

/// [`ChangelogTool`] backed by `dch`.
#[derive(Debug, Clone)]
pub struct DchTool {
    program: String,
    message: String,
}

impl DchTool {
    pub fn new(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            message: message.into(),
        }
    }

    fn message_for(&self, version: &str) -> String {
        self.message.replace("{version}", version)
    }
}

impl Default for DchTool {
    fn default() -> Self {
        Self::new(DEFAULT_CHANGELOG_TOOL, DEFAULT_CHANGELOG_MESSAGE)
    }
}

impl ChangelogTool for DchTool {
    fn new_version(&self, path: &Path, version: &str) -> Result<()> {
        debug!("running {} on {}", self.program, path.display());

        let output = Command::new(&self.program)
            .arg("--changelog")
            .arg(path)
            .args(["--check-dirname-level", "0", "--force-bad-version"])
            .arg("--newversion")
            .arg(version)
            .arg(self.message_for(version))
            .output()
            .map_err(|e| SetVersionError::ChangelogTool {
                path: path.to_path_buf(),
                status: format!("failed to start {}", self.program),
                stderr: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SetVersionError::ChangelogTool {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr)
                    .trim()
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// The version a new entry must be created for, if any.
///
/// Returns `None` when the top entry already carries `new`.
pub fn next_version<'a>(current: Option<&str>, new: &'a str) -> Option<&'a str> {
    match current {
        Some(current) if current == new => None,
        _ => Some(new),
    }
}

/// Rewrites `debian.changelog` and `debian/changelog`.
pub struct DebianChangelogRewriter<'a> {
    tool: &'a dyn ChangelogTool,
}

impl<'a> DebianChangelogRewriter<'a> {
    pub fn new(tool: &'a dyn ChangelogTool) -> Self {
        Self { tool }
    }
}

impl FileRewriter for DebianChangelogRewriter<'_> {
    fn rewrite(
        &self,
        source: &Path,
        dest: &Path,
        version: &RunVersion,
    ) -> Result<bool> {
        let content = writer::read_file(source)?;
        let current = changelog_version(&content);

        if source != dest {
            // the tool edits in place, so the copy has to exist first
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| SetVersionError::io(parent, e))?;
            }
            fs::copy(source, dest).map_err(|e| SetVersionError::io(dest, e))?;
        }

        let Some(new) = next_version(current.as_deref(), &version.normalized)
        else {
            info!(
                "{} already at version {version}, skipping",
                source.display()
            );
            return Ok(false);
        };

        info!("adding changelog entry {new} to {}", dest.display());
        self.tool.new_version(dest, new)?;

        Ok(true)
    }
}
