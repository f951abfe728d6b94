//! Detect the version of upstream sources and write it into packaging
//! metadata: RPM spec files, Arch Linux PKGBUILDs and Debian changelogs.
pub mod archive;
pub mod cli;
pub mod command;
pub mod config;
pub mod detection;
pub mod discovery;
pub mod error;
pub mod rewriter;
pub mod version;
pub mod writer;

pub use cli::Args;
pub use command::{RunSummary, run, run_with};
pub use error::{Result, SetVersionError};
pub use version::{RunVersion, normalize};

#[cfg(test)]
pub mod test_helpers;
