//! CLI argument parsing.
use clap::Parser;
use std::path::PathBuf;

/// Detect a source version and write it into spec files, PKGBUILDs and
/// Debian changelogs.
#[derive(Parser, Debug, Clone, Default)]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Args {
    #[arg(long)]
    /// Use this version instead of detecting one.
    pub version: Option<String>,

    #[arg(long)]
    /// Package basename; only sources starting with it are considered.
    pub basename: Option<String>,

    #[arg(long = "file")]
    /// Only rewrite this file. May be repeated.
    pub files: Vec<PathBuf>,

    #[arg(long)]
    /// Detection pattern with exactly one capture group for the version.
    pub regex: Option<String>,

    #[arg(long)]
    /// Write results below this directory instead of rewriting in place.
    pub outdir: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    /// Directory holding the sources and metadata files.
    pub workdir: PathBuf,

    #[arg(long)]
    /// Configuration file. Defaults to set_version.toml in the workdir.
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}
