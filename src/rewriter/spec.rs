//! RPM spec file rewriting.
//!
//! The `Version:` tag receives the converted version. When conversion changed
//! the version, the raw token is also kept in a `%define` so `%setup` can
//! still find the unpacked source directory, whose name uses the raw token.
use log::*;
use regex::{Captures, Regex};
use std::{path::Path, sync::LazyLock};

use crate::{
    error::Result,
    rewriter::traits::{FileRewriter, rewrite_text_file},
    version::RunVersion,
};

/// Macro holding the version before conversion.
pub const UNCONVERTED_MACRO: &str = "version_unconverted";

// the value stops at the first `%` so trailing inline macros survive
static VERSION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Version:([ \t\f\v]*)[^%\n\r]*").unwrap()
});

static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>%define\s+(?P<name>\S+)\s+)\S+").unwrap()
});

static SETUP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%setup(?:\s|$)").unwrap());

static NAME_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s-[A-Za-z]*n").unwrap());

/// Rewrites `*.spec` files.
pub struct SpecRewriter {}

impl SpecRewriter {
    pub fn new() -> Self {
        Self {}
    }

    /// Apply `version` to spec file content.
    pub fn transform(&self, content: &str, version: &RunVersion) -> String {
        let mut updated = replace_version_tag(content, &version.normalized);

        if version.is_converted() {
            updated = replace_define(&updated, UNCONVERTED_MACRO, &version.raw);
            updated = replace_setup(&updated, UNCONVERTED_MACRO);
        }

        updated
    }
}

impl Default for SpecRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileRewriter for SpecRewriter {
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

/// Replace the value of every `Version:` tag.
pub fn replace_version_tag(content: &str, version: &str) -> String {
    VERSION_TAG
        .replace_all(content, |captures: &Captures| {
            format!("Version:{}{version}", &captures[1])
        })
        .to_string()
}

/// Set `%define <name> <value>`.
///
/// An existing definition keeps its spacing and only its value changes.
/// Otherwise the definition and a blank line are inserted before the first
/// `Name:` tag, or at the top of the file when there is none.
pub fn replace_define(content: &str, name: &str, value: &str) -> String {
    let mut lines = content.split('\n').map(String::from).collect::<Vec<_>>();
    let mut replaced = false;

    for line in lines.iter_mut() {
        let Some(captures) = DEFINE.captures(line) else {
            continue;
        };

        if &captures["name"] != name {
            continue;
        }

        let prefix = &captures["prefix"];
        let rest = &line[captures.get(0).map_or(0, |m| m.end())..];
        *line = format!("{prefix}{value}{rest}");
        replaced = true;
    }

    if !replaced {
        let position = lines
            .iter()
            .position(|line| line.starts_with("Name:"))
            .unwrap_or_else(|| {
                warn!("no Name: tag found, adding %define {name} at the top");
                0
            });

        lines.splice(
            position..position,
            [format!("%define {name} {value}"), String::new()],
        );
    }

    lines.join("\n")
}

/// Point `%setup` at the unpacked directory named with `%{<macro_name>}`.
///
/// With a `-n` option, also in combined (`-qn`) or attached (`-nfoo`) form,
/// `%{version}` is replaced by the macro; a literal version is left alone.
/// Without `-n`, `-n %{name}-%{<macro_name>}` is appended after the existing
/// flags.
pub fn replace_setup(content: &str, macro_name: &str) -> String {
    let reference = format!("%{{{macro_name}}}");

    content
        .split('\n')
        .map(|line| {
            if !SETUP_LINE.is_match(line) {
                return line.to_string();
            }

            if NAME_OPTION.is_match(line) {
                return line.replace("%{version}", &reference);
            }

            let flags = line["%setup".len()..].trim_start();
            format!("%setup {flags} -n %{{name}}-{reference}")
        })
        .collect::<Vec<String>>()
        .join("\n")
}
