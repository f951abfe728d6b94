use std::path::Path;

use crate::{error::Result, version::RunVersion, writer};

/// Rewrites the version held by one metadata file dialect.
pub trait FileRewriter {
    /// Apply `version` to `source` and store the result at `dest`.
    ///
    /// `dest` equals `source` for in-place rewrites. Returns whether the
    /// content at `dest` differs from `source`. Running twice with the same
    /// version leaves the file unchanged the second time.
    fn rewrite(
        &self,
        source: &Path,
        dest: &Path,
        version: &RunVersion,
    ) -> Result<bool>;
}

/// Shared read-transform-write cycle for dialects edited as text.
///
/// An in-place rewrite that changes nothing does not touch the file.
pub(crate) fn rewrite_text_file<F>(
    source: &Path,
    dest: &Path,
    transform: F,
) -> Result<bool>
where
    F: FnOnce(&str) -> String,
{
    let content = writer::read_file(source)?;
    let updated = transform(&content);
    let changed = updated != content;

    if changed || source != dest {
        writer::write_atomic(dest, &updated, source)?;
    }

    Ok(changed)
}
