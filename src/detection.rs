//! Detection of the version to apply and of the archive's packaging
//! ecosystem.
pub mod package_type;
pub mod version;
