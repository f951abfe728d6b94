use log::*;
use regex::{Captures, Regex};
use std::{path::Path, sync::LazyLock};

use crate::{
    error::Result,
    rewriter::traits::{FileRewriter, rewrite_text_file},
    version::RunVersion,
};

static PKGVER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^pkgver=.*$").unwrap());

// matches one-line values and parenthesised arrays spanning several lines,
// including per-architecture arrays such as `sha256sums_x86_64`
static CHECKSUMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^((?:md5|sha1|sha224|sha256|sha384|sha512|b2)sums(?:_\w+)?)=(?:\([^)]*\)|[^\n]*)",
    )
    .unwrap()
});

/// Rewrites Arch Linux `PKGBUILD` files.
///
/// `pkgver` receives the version and every checksum array becomes
/// `('SKIP')`, since the sources they covered are about to change.
pub struct PkgbuildRewriter {}

impl PkgbuildRewriter {
    pub fn new() -> Self {
        Self {}
    }

    pub fn transform(&self, content: &str, version: &RunVersion) -> String {
        let updated = PKGVER.replace_all(content, |_: &Captures| {
            format!("pkgver={}", version.normalized)
        });

        CHECKSUMS
            .replace_all(&updated, |captures: &Captures| {
                format!("{}=('SKIP')", &captures[1])
            })
            .to_string()
    }
}

impl Default for PkgbuildRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileRewriter for PkgbuildRewriter {
    fn rewrite(
        &self,
        source: &Path,
        dest: &Path,
        version: &RunVersion,
    ) -> Result<bool> {
        info!("updating {} to version {version}", source.display());
        rewrite_text_file(source, dest, |content| {
            self.transform(content, version)
        })
    }
}
