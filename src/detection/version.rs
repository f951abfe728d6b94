//! Version detection from source archives and Debian changelogs.
use log::*;
use regex::Regex;
use std::{fs, path::Path, sync::LazyLock};

use crate::{
    archive::{LocalArchive, strip_archive_suffix},
    error::{Result, SetVersionError},
};

/// Placeholder replaced by the regex-escaped basename in a pattern.
pub const BASENAME_PLACEHOLDER: &str = "{basename}";

/// Default detection pattern: the first digit after the last `-` or `_`
/// starts the version.
pub const DEFAULT_PATTERN: &str = r"^{basename}.*[-_]([\d][^/]*)$";

/// Changelogs consulted, in order, when no archive yields a version.
pub const DEBIAN_CHANGELOGS: &[&str] = &["debian.changelog", "debian/changelog"];

// first line of a Debian changelog entry: `package (version) dists; ...`
static CHANGELOG_TOPLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\w[-+0-9a-z.]*) \(([^\(\) \t]+)\)((?:\s+[-+0-9a-z.]+)+);")
        .unwrap()
});

/// Return the version of the top entry of a Debian changelog.
pub fn changelog_version(content: &str) -> Option<String> {
    let topline = content.lines().next()?;
    CHANGELOG_TOPLINE
        .captures(topline)
        .and_then(|captures| captures.get(2))
        .map(|m| m.as_str().to_string())
}

/// How a version is located: a pattern with exactly one capture group and an
/// optional literal prefix that archive and member names must start with.
#[derive(Debug, Clone)]
pub struct DetectionRule {
    pattern: Regex,
    basename: Option<String>,
}

impl DetectionRule {
    /// Build a rule, falling back to [`DEFAULT_PATTERN`].
    pub fn new(pattern: Option<&str>, basename: Option<&str>) -> Result<Self> {
        let basename = basename
            .filter(|basename| !basename.is_empty())
            .map(String::from);

        let escaped = basename
            .as_deref()
            .map(regex::escape)
            .unwrap_or_default();

        let expanded = pattern
            .unwrap_or(DEFAULT_PATTERN)
            .replace(BASENAME_PLACEHOLDER, &escaped);

        let regex = Regex::new(&expanded)?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(SetVersionError::invalid_pattern(
                expanded,
                format!("expected exactly one capture group, found {groups}"),
            ));
        }

        Ok(Self {
            pattern: regex,
            basename,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn basename(&self) -> Option<&str> {
        self.basename.as_deref()
    }

    fn accepts(&self, name: &str) -> bool {
        self.basename
            .as_deref()
            .is_none_or(|basename| name.starts_with(basename))
    }

    fn capture(&self, candidate: &str) -> Option<String> {
        self.pattern
            .captures(candidate)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|version| !version.is_empty())
    }
}

/// Extracts a raw version token from the archives of a working directory.
pub struct VersionDetector {
    rule: DetectionRule,
}

impl VersionDetector {
    pub fn new(rule: DetectionRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &DetectionRule {
        &self.rule
    }

    /// Detect a version from the archives, which must be in lexical order.
    ///
    /// The first archive that yields a version wins. Other archives yielding a
    /// different version are reported but never used.
    pub fn detect(&self, archives: &[LocalArchive]) -> Option<String> {
        let mut candidates = archives
            .iter()
            .filter(|archive| self.rule.accepts(&archive.name))
            .filter_map(|archive| {
                self.detect_archive(archive)
                    .map(|version| (archive.name.as_str(), version))
            });

        let (name, version) = candidates.next()?;

        let ignored = candidates
            .filter(|(_, other)| other != &version)
            .map(|(other_name, other)| format!("{other_name} ({other})"))
            .collect::<Vec<String>>();

        if !ignored.is_empty() {
            warn!(
                "several archives match: using {version} from {name}, ignoring {}",
                ignored.join(", ")
            );
        }

        info!("detected version {version} from {name}");

        Some(version)
    }

    /// Match top-level directory entries first, then the archive filename
    /// without its suffix, then the full filename.
    fn detect_archive(&self, archive: &LocalArchive) -> Option<String> {
        let from_dir = archive
            .members
            .iter()
            .filter(|member| member.is_directory)
            .map(|member| {
                member.name.strip_prefix("./").unwrap_or(&member.name)
            })
            .filter(|name| !name.is_empty() && !name.contains('/'))
            .filter(|name| self.rule.accepts(name))
            .find_map(|name| self.rule.capture(name));

        if let Some(version) = from_dir {
            debug!("{}: version {version} from directory entry", archive.name);
            return Some(version);
        }

        let stem = strip_archive_suffix(&archive.name).unwrap_or(&archive.name);

        self.rule
            .capture(stem)
            .or_else(|| self.rule.capture(&archive.name))
    }

    /// Read the top entry version of the first Debian changelog found in
    /// `dir`.
    pub fn detect_changelog(dir: &Path) -> Result<Option<String>> {
        for name in DEBIAN_CHANGELOGS {
            let path = dir.join(name);

            if !path.is_file() {
                continue;
            }

            let content = fs::read_to_string(&path)
                .map_err(|e| SetVersionError::io(&path, e))?;

            if let Some(version) = changelog_version(&content) {
                info!("detected version {version} from {}", path.display());
                return Ok(Some(version));
            }
        }

        Ok(None)
    }

    /// Detect a version from the archives, falling back to a Debian changelog.
    pub fn autodetect(
        &self,
        dir: &Path,
        archives: &[LocalArchive],
    ) -> Result<String> {
        if let Some(version) = self.detect(archives) {
            return Ok(version);
        }

        if let Some(version) = Self::detect_changelog(dir)? {
            return Ok(version);
        }

        Err(SetVersionError::detection(self.rule.pattern(), dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveMember;
    use tempfile::TempDir;

    fn archive(name: &str, dirs: &[&str]) -> LocalArchive {
        LocalArchive {
            name: name.into(),
            members: dirs.iter().map(|dir| ArchiveMember::dir(*dir)).collect(),
        }
    }

    fn detector(pattern: Option<&str>, basename: Option<&str>) -> VersionDetector {
        VersionDetector::new(DetectionRule::new(pattern, basename).unwrap())
    }

    #[test]
    fn detects_from_directory_entry() {
        let detector = detector(Some("^test-v(.*)"), None);
        let archives = vec![archive("source.tar", &["test-v1.2.3"])];

        assert_eq!(detector.detect(&archives), Some("1.2.3".into()));
    }

    #[test]
    fn detects_from_filename_without_suffix() {
        let detector = detector(Some("^test-v(.*)"), None);
        let archives = vec![archive("test-v1.2.3.tar", &[])];

        assert_eq!(detector.detect(&archives), Some("1.2.3".into()));
    }

    #[test]
    fn directory_entry_and_filename_agree() {
        let detector = detector(Some("^test-v(.*)"), None);
        let with_dir = vec![archive("test-v1.2.3.tar", &["test-v1.2.3"])];
        let without_dir = vec![archive("test-v1.2.3.tar", &[])];

        assert_eq!(detector.detect(&with_dir), detector.detect(&without_dir));
    }

    #[test]
    fn falls_back_to_full_filename() {
        let detector = detector(Some(r"^foo-(.*)\.tar\.gz$"), None);
        let archives = vec![archive("foo-3.1.tar.gz", &[])];

        assert_eq!(detector.detect(&archives), Some("3.1".into()));
    }

    #[test]
    fn default_pattern_reads_version_after_last_separator() {
        let detector = detector(None, None);
        let archives = vec![archive("python-foo_bar-2.0.1rc1.tar.gz", &[])];

        assert_eq!(detector.detect(&archives), Some("2.0.1rc1".into()));
    }

    #[test]
    fn prefers_directory_entry_over_filename() {
        let detector = detector(None, None);
        let archives = vec![archive("foo-latest.tar", &["foo-4.2"])];

        assert_eq!(detector.detect(&archives), Some("4.2".into()));
    }

    #[test]
    fn ignores_nested_directory_entries() {
        let detector = detector(None, None);
        let archives = vec![archive(
            "foo-snapshot.tar",
            &["foo-snapshot", "foo-snapshot/vendor/bar-9.9"],
        )];

        assert_eq!(detector.detect(&archives), None);
    }

    #[test]
    fn basename_restricts_archives_and_members() {
        let detector = detector(None, Some("testprog"));
        let archives = vec![
            archive("aaa-0.1.tar", &["aaa-0.1"]),
            archive("testprog-source.tar", &["other-9.0", "testprog-1.0"]),
        ];

        assert_eq!(detector.detect(&archives), Some("1.0".into()));
    }

    #[test]
    fn basename_is_escaped_in_pattern() {
        let detector = detector(None, Some("lib.c++"));
        let archives = vec![
            archive("libxc--2.0.tar", &[]),
            archive("lib.c++-1.5.tar.xz", &[]),
        ];

        assert_eq!(detector.detect(&archives), Some("1.5".into()));
    }

    #[test]
    fn first_archive_in_order_wins() {
        let detector = detector(None, None);
        let archives = vec![
            archive("alpha-1.0.tar", &[]),
            archive("beta-2.0.tar", &[]),
        ];

        assert_eq!(detector.detect(&archives), Some("1.0".into()));
    }

    #[test]
    fn returns_none_without_match() {
        let detector = detector(None, None);
        let archives = vec![archive("snapshot.tar", &["snapshot"])];

        assert_eq!(detector.detect(&archives), None);
    }

    #[test]
    fn rejects_patterns_without_single_capture_group() {
        let none = DetectionRule::new(Some("^foo-.*$"), None);
        assert!(matches!(none, Err(SetVersionError::InvalidPattern { .. })));

        let two = DetectionRule::new(Some("^(foo)-(.*)$"), None);
        assert!(matches!(two, Err(SetVersionError::InvalidPattern { .. })));

        let broken = DetectionRule::new(Some("^foo-(.*"), None);
        assert!(matches!(broken, Err(SetVersionError::Regex(_))));
    }

    #[test]
    fn expands_basename_placeholder() {
        let rule = DetectionRule::new(None, Some("foo")).unwrap();
        assert_eq!(rule.pattern(), r"^foo.*[-_]([\d][^/]*)$");
        assert_eq!(rule.basename(), Some("foo"));

        let rule = DetectionRule::new(None, Some("")).unwrap();
        assert_eq!(rule.pattern(), r"^.*[-_]([\d][^/]*)$");
        assert_eq!(rule.basename(), None);
    }

    #[test]
    fn parses_changelog_top_entry() {
        let content = "foobar (1.2.3~456+789-Devel3) unstable; urgency=medium\n\n  * Initial release.\n\n -- Someone <someone@example.com>  Mon, 01 Jan 2024 00:00:00 +0000\n";
        assert_eq!(
            changelog_version(content),
            Some("1.2.3~456+789-Devel3".into())
        );
        assert_eq!(changelog_version("not a changelog"), None);
        assert_eq!(changelog_version(""), None);
    }

    #[test]
    fn autodetect_falls_back_to_debian_changelog() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("debian.changelog"),
            "foobar (8.8.8) UNRELEASED; urgency=medium\n",
        )
        .unwrap();

        let detector = detector(None, None);
        let version = detector.autodetect(temp_dir.path(), &[]).unwrap();

        assert_eq!(version, "8.8.8");
    }

    #[test]
    fn autodetect_fails_without_any_source() {
        let temp_dir = TempDir::new().unwrap();
        let detector = detector(Some("^test-v(.*)"), None);

        let result = detector.autodetect(temp_dir.path(), &[]);

        match result {
            Err(SetVersionError::Detection { pattern, dir }) => {
                assert_eq!(pattern, "^test-v(.*)");
                assert_eq!(dir, temp_dir.path());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
