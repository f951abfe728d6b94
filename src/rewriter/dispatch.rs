//! Static dispatch over the per-dialect rewriters.

use std::path::Path;

use crate::{
    error::Result,
    rewriter::{
        debian_changelog::{ChangelogTool, DebianChangelogRewriter},
        pkgbuild::PkgbuildRewriter,
        spec::SpecRewriter,
        traits::FileRewriter,
        types::Dialect,
    },
    version::RunVersion,
};

/// Dialect-specific rewriter.
pub enum Rewriter<'a> {
    /// RPM spec files
    Spec(SpecRewriter),
    /// Arch Linux PKGBUILDs
    Pkgbuild(PkgbuildRewriter),
    /// Debian changelogs, edited through an external tool
    DebianChangelog(DebianChangelogRewriter<'a>),
}

impl<'a> Rewriter<'a> {
    /// Create the rewriter for `dialect`.
    ///
    /// `tool` is only used by the Debian changelog rewriter.
    pub fn new(dialect: Dialect, tool: &'a dyn ChangelogTool) -> Self {
        match dialect {
            Dialect::Spec => Rewriter::Spec(SpecRewriter::new()),
            Dialect::Pkgbuild => Rewriter::Pkgbuild(PkgbuildRewriter::new()),
            Dialect::DebianChangelog => {
                Rewriter::DebianChangelog(DebianChangelogRewriter::new(tool))
            }
        }
    }
}

impl FileRewriter for Rewriter<'_> {
    fn rewrite(
        &self,
        source: &Path,
        dest: &Path,
        version: &RunVersion,
    ) -> Result<bool> {
        match self {
            Rewriter::Spec(rewriter) => rewriter.rewrite(source, dest, version),
            Rewriter::Pkgbuild(rewriter) => {
                rewriter.rewrite(source, dest, version)
            }
            Rewriter::DebianChangelog(rewriter) => {
                rewriter.rewrite(source, dest, version)
            }
        }
    }
}

impl std::fmt::Debug for Rewriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rewriter::Spec(_) => write!(f, "Rewriter::Spec"),
            Rewriter::Pkgbuild(_) => write!(f, "Rewriter::Pkgbuild"),
            Rewriter::DebianChangelog(_) => {
                write!(f, "Rewriter::DebianChangelog")
            }
        }
    }
}
