//! Configuration loading and parsing for `set_version.toml` files.
//!
//! Every key is optional. Command-line arguments take precedence over values
//! read from the file.
use log::*;
use serde::Deserialize;
use std::path::Path;

use crate::{
    error::{Result, SetVersionError},
    rewriter::debian_changelog::{
        DEFAULT_CHANGELOG_MESSAGE, DEFAULT_CHANGELOG_TOOL,
    },
    writer,
};

/// Default configuration filename, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "set_version.toml";

/// Root configuration structure for `set_version.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Detection pattern with exactly one capture group. May contain the
    /// `{basename}` placeholder.
    pub regex: Option<String>,
    /// Package basename used to narrow archive detection.
    pub basename: Option<String>,
    /// Program that adds Debian changelog entries.
    pub changelog_tool: String,
    /// Changelog entry text; `{version}` is replaced by the new version.
    pub changelog_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regex: None,
            basename: None,
            changelog_tool: DEFAULT_CHANGELOG_TOOL.into(),
            changelog_message: DEFAULT_CHANGELOG_MESSAGE.into(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Load the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `set_version.toml` in `workdir`
    /// is used when present, and defaults when it is not.
    pub fn load(workdir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(SetVersionError::io(
                    path,
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "configuration file not found",
                    ),
                ));
            }

            info!("loading configuration from {}", path.display());
            return Self::parse(&writer::read_file(path)?);
        }

        let path = workdir.join(DEFAULT_CONFIG_FILE);

        if path.is_file() {
            info!("loading configuration from {}", path.display());
            Self::parse(&writer::read_file(&path)?)
        } else {
            debug!("{DEFAULT_CONFIG_FILE} not found: using default");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_lines;
    use tempfile::TempDir;

    #[test]
    fn loads_defaults() {
        let config = Config::default();
        assert_eq!(config.regex, None);
        assert_eq!(config.basename, None);
        assert_eq!(config.changelog_tool, "dch");
        assert_eq!(config.changelog_message, "Update to version {version}");
    }

    #[test]
    fn parses_partial_file() {
        let config = Config::parse("basename = \"foo\"\n").unwrap();

        assert_eq!(config.basename.as_deref(), Some("foo"));
        assert_eq!(config.regex, None);
        assert_eq!(config.changelog_tool, "dch");
    }

    #[test]
    fn parses_all_keys() {
        let config = Config::parse(
            r#"
regex = '^foo-v(.*)$'
basename = "foo"
changelog_tool = "/usr/local/bin/dch"
changelog_message = "New upstream {version}"
"#,
        )
        .unwrap();

        assert_eq!(config.regex.as_deref(), Some("^foo-v(.*)$"));
        assert_eq!(config.changelog_tool, "/usr/local/bin/dch");
        assert_eq!(config.changelog_message, "New upstream {version}");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = Config::parse("regexp = 'typo'\n");
        assert!(matches!(result, Err(SetVersionError::Config(_))));
    }

    #[test]
    fn falls_back_to_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();

        let config = Config::load(temp_dir.path(), None).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn loads_file_from_workdir() {
        let temp_dir = TempDir::new().unwrap();
        write_lines(temp_dir.path(), DEFAULT_CONFIG_FILE, &["basename = 'bar'"]);

        let config = Config::load(temp_dir.path(), None).unwrap();

        assert_eq!(config.basename.as_deref(), Some("bar"));
    }

    #[test]
    fn explicit_file_must_exist() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("custom.toml");

        let err = Config::load(temp_dir.path(), Some(&missing)).unwrap_err();

        assert!(err.to_string().contains("custom.toml"));
    }

    #[test]
    fn explicit_file_wins_over_workdir_file() {
        let temp_dir = TempDir::new().unwrap();
        write_lines(temp_dir.path(), DEFAULT_CONFIG_FILE, &["basename = 'bar'"]);
        let custom =
            write_lines(temp_dir.path(), "custom.toml", &["basename = 'baz'"]);

        let config = Config::load(temp_dir.path(), Some(&custom)).unwrap();

        assert_eq!(config.basename.as_deref(), Some("baz"));
    }
}
