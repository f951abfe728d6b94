//! Run orchestration.
//!
//! A run resolves the rewrite targets, settles on a single version, then
//! applies that version to every target. Nothing is written before the
//! version is known, so a failed detection leaves every file untouched.
use log::*;
use std::path::{Path, PathBuf};

use crate::{
    archive::{ArchiveReader, TarArchiveReader, scan_archives},
    cli::Args,
    config::Config,
    detection::{
        package_type::{PackageType, PackageTypeDetector},
        version::{DetectionRule, VersionDetector},
    },
    discovery::{list_local_files, select_targets},
    error::Result,
    rewriter::{
        debian_changelog::{ChangelogTool, DchTool},
        dispatch::Rewriter,
        traits::FileRewriter,
    },
    version::RunVersion,
};

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub version: RunVersion,
    pub package_type: PackageType,
    /// Targets whose content changed, relative to the working directory.
    pub rewritten: Vec<PathBuf>,
    /// Targets that already carried the version.
    pub unchanged: Vec<PathBuf>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "version {}", self.version.normalized)?;

        if self.version.is_converted() {
            write!(f, " (from {})", self.version.raw)?;
        }

        write!(
            f,
            ", {} package: {} rewritten, {} unchanged",
            self.package_type,
            self.rewritten.len(),
            self.unchanged.len()
        )
    }
}

/// Execute a run with the archive reader and changelog tool used in
/// production.
pub fn run(args: &Args) -> Result<RunSummary> {
    let config = Config::load(&args.workdir, args.config.as_deref())?;
    let reader = TarArchiveReader::new();
    let tool = DchTool::new(
        config.changelog_tool.clone(),
        config.changelog_message.clone(),
    );

    run_with(args, &config, &reader, &tool)
}

/// Execute a run against the given collaborators.
pub fn run_with(
    args: &Args,
    config: &Config,
    reader: &dyn ArchiveReader,
    tool: &dyn ChangelogTool,
) -> Result<RunSummary> {
    let workdir = args.workdir.as_path();

    let regex = args.regex.as_deref().or(config.regex.as_deref());
    let basename = args.basename.as_deref().or(config.basename.as_deref());
    let rule = DetectionRule::new(regex, basename)?;

    let targets = select_targets(workdir, &args.files)?;

    let files = list_local_files(workdir)?;
    let archives = scan_archives(reader, workdir, &files);

    let raw = match &args.version {
        Some(version) => {
            info!("using requested version {version}");
            version.clone()
        }
        None => VersionDetector::new(rule).autodetect(workdir, &archives)?,
    };

    let package_type = PackageTypeDetector::detect_archives(&archives);

    let version = match package_type {
        PackageType::Python => RunVersion::python(raw),
        PackageType::Generic => RunVersion::unconverted(raw),
    };

    info!("version for this run: {version}");

    let mut summary = RunSummary {
        version,
        package_type,
        rewritten: vec![],
        unchanged: vec![],
    };

    if targets.is_empty() {
        warn!("no files to rewrite found in {}", workdir.display());
    }

    for target in targets {
        let source = workdir.join(&target.path);
        let dest = destination(workdir, args.outdir.as_deref(), &target.path);
        let rewriter = Rewriter::new(target.dialect, tool);

        debug!("{rewriter:?}: {} -> {}", source.display(), dest.display());

        if rewriter.rewrite(&source, &dest, &summary.version)? {
            summary.rewritten.push(target.path);
        } else {
            summary.unchanged.push(target.path);
        }
    }

    Ok(summary)
}

fn destination(workdir: &Path, outdir: Option<&Path>, relative: &Path) -> PathBuf {
    match outdir {
        Some(outdir) => outdir.join(relative),
        None => workdir.join(relative),
    }
}
