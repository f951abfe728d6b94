//! Version rewriting for RPM spec files, Arch PKGBUILDs and Debian changelogs.
pub mod debian_changelog;
pub mod dispatch;
pub mod pkgbuild;
pub mod spec;
pub mod traits;
pub mod types;
