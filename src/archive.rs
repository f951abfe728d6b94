//! Source archive inspection.
//!
//! Only the index of an archive is ever read: member names and whether each
//! member is a directory. Nothing is extracted.

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use log::*;
use std::{fs::File, io::Read, path::Path};

use crate::error::{Result, SetVersionError};

/// Filename suffixes of source archives eligible for version detection,
/// longest first so compound suffixes win over `.tar`.
pub const ARCHIVE_SUFFIXES: &[&str] = &[
    ".tar.gz", ".tar.bz2", ".tar.xz", ".tar.zst", ".obscpio", ".tbz2",
    ".tzst", ".tar", ".tgz", ".txz", ".zip", ".gem",
];

/// A single entry in an archive index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Member path without a trailing slash.
    pub name: String,
    pub is_directory: bool,
}

impl ArchiveMember {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }
}

/// A source archive found in the working directory together with its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalArchive {
    /// Filename relative to the working directory.
    pub name: String,
    pub members: Vec<ArchiveMember>,
}

/// Lists the members of an archive on disk.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveReader {
    /// Return the index of the archive at `path`.
    ///
    /// Archives whose format has no readable index (zip, cpio, gem) yield an
    /// empty list; they can still be matched by filename.
    fn list_members(&self, path: &Path) -> Result<Vec<ArchiveMember>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TarCompression {
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

/// Return the archive suffix of `filename`, if it has one.
pub fn archive_suffix(filename: &str) -> Option<&'static str> {
    ARCHIVE_SUFFIXES
        .iter()
        .find(|suffix| filename.ends_with(*suffix) && filename.len() > suffix.len())
        .copied()
}

/// Return `filename` without its archive suffix.
pub fn strip_archive_suffix(filename: &str) -> Option<&str> {
    archive_suffix(filename)
        .map(|suffix| &filename[..filename.len() - suffix.len()])
}

fn tar_compression(filename: &str) -> Option<TarCompression> {
    match archive_suffix(filename)? {
        ".tar" => Some(TarCompression::None),
        ".tar.gz" | ".tgz" => Some(TarCompression::Gzip),
        ".tar.bz2" | ".tbz2" => Some(TarCompression::Bzip2),
        ".tar.xz" | ".txz" => Some(TarCompression::Xz),
        ".tar.zst" | ".tzst" => Some(TarCompression::Zstd),
        _ => None,
    }
}

/// Reads tar indexes, plain or compressed with gzip, bzip2, xz or zstd.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarArchiveReader;

impl TarArchiveReader {
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveReader for TarArchiveReader {
    fn list_members(&self, path: &Path) -> Result<Vec<ArchiveMember>> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let Some(compression) = tar_compression(&filename) else {
            debug!("{filename}: no readable index, filename only");
            return Ok(vec![]);
        };

        let file = File::open(path).map_err(|e| SetVersionError::io(path, e))?;

        match compression {
            TarCompression::None => read_members(path, file),
            TarCompression::Gzip => read_members(path, GzDecoder::new(file)),
            TarCompression::Bzip2 => read_members(path, BzDecoder::new(file)),
            TarCompression::Xz => {
                read_members(path, xz2::read::XzDecoder::new(file))
            }
            TarCompression::Zstd => {
                let decoder = zstd::Decoder::new(file)
                    .map_err(|e| SetVersionError::io(path, e))?;
                read_members(path, decoder)
            }
        }
    }
}

fn read_members<R: Read>(path: &Path, reader: R) -> Result<Vec<ArchiveMember>> {
    let mut archive = tar::Archive::new(reader);
    let mut members = vec![];

    let entries = archive
        .entries()
        .map_err(|e| SetVersionError::io(path, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| SetVersionError::io(path, e))?;
        let name = entry
            .path()
            .map_err(|e| SetVersionError::io(path, e))?
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();

        members.push(ArchiveMember {
            name,
            is_directory: entry.header().entry_type().is_dir(),
        });
    }

    Ok(members)
}

/// Index every source archive among `filenames`, in lexical order.
///
/// An archive whose index cannot be read is kept with no members so it can
/// still be matched by filename.
pub fn scan_archives(
    reader: &dyn ArchiveReader,
    dir: &Path,
    filenames: &[String],
) -> Vec<LocalArchive> {
    let mut names = filenames
        .iter()
        .filter(|name| archive_suffix(name).is_some())
        .cloned()
        .collect::<Vec<String>>();
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let members = match reader.list_members(&dir.join(&name)) {
                Ok(members) => members,
                Err(err) => {
                    warn!("unable to read archive index: {err}");
                    vec![]
                }
            };
            debug!("{name}: {} members", members.len());
            LocalArchive { name, members }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_tarball;
    use tempfile::TempDir;

    #[test]
    fn recognizes_archive_suffixes() {
        assert_eq!(archive_suffix("foo-1.0.tar.gz"), Some(".tar.gz"));
        assert_eq!(archive_suffix("foo-1.0.tar"), Some(".tar"));
        assert_eq!(archive_suffix("foo-1.0.tbz2"), Some(".tbz2"));
        assert_eq!(archive_suffix("foo-1.0.obscpio"), Some(".obscpio"));
        assert_eq!(archive_suffix("foo.spec"), None);
        assert_eq!(archive_suffix("PKGBUILD"), None);
        assert_eq!(archive_suffix(".tar"), None);
    }

    #[test]
    fn strips_archive_suffixes() {
        assert_eq!(strip_archive_suffix("test-v1.2.3.tar"), Some("test-v1.2.3"));
        assert_eq!(
            strip_archive_suffix("foo-2.0.tar.zst"),
            Some("foo-2.0")
        );
        assert_eq!(strip_archive_suffix("foo.spec"), None);
    }

    #[test]
    fn lists_plain_tar_members() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tarball(
            temp_dir.path(),
            "test-1.0.tar",
            &["test-1.0"],
            &["test-1.0/setup.py"],
        );

        let members = TarArchiveReader::new().list_members(&path).unwrap();

        assert_eq!(
            members,
            vec![
                ArchiveMember::dir("test-1.0"),
                ArchiveMember::file("test-1.0/setup.py"),
            ]
        );
    }

    #[test]
    fn lists_gzip_tar_members() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_tarball(
            temp_dir.path(),
            "test-1.0.tar.gz",
            &["test-1.0"],
            &["test-1.0/PKG-INFO"],
        );

        let members = TarArchiveReader::new().list_members(&path).unwrap();

        assert_eq!(members.len(), 2);
        assert!(members[0].is_directory);
        assert_eq!(members[1].name, "test-1.0/PKG-INFO");
    }

    #[test]
    fn lists_bzip2_tar_members() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo-latest.tbz2");
        let encoder = bzip2::write::BzEncoder::new(
            std::fs::File::create(&path).unwrap(),
            bzip2::Compression::default(),
        );
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        builder
            .append_data(&mut header, "foo-3.1", std::io::empty())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let members = TarArchiveReader::new().list_members(&path).unwrap();

        assert_eq!(members, vec![ArchiveMember::dir("foo-3.1")]);
    }

    #[test]
    fn returns_no_members_for_formats_without_index() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo-1.0.zip");
        std::fs::write(&path, b"not inspected").unwrap();

        let members = TarArchiveReader::new().list_members(&path).unwrap();

        assert!(members.is_empty());
    }

    #[test]
    fn fails_on_corrupt_tar() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("foo-1.0.tar.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();

        let result = TarArchiveReader::new().list_members(&path);

        assert!(matches!(result, Err(SetVersionError::Io { .. })));
    }

    #[test]
    fn scan_keeps_unreadable_archives_without_members() {
        let mut reader = MockArchiveReader::new();
        reader.expect_list_members().returning(|path| {
            if path.ends_with("bad-1.0.tar") {
                Err(SetVersionError::io(
                    path,
                    std::io::Error::other("truncated"),
                ))
            } else {
                Ok(vec![ArchiveMember::dir("good-2.0")])
            }
        });

        let filenames = vec![
            "good-2.0.tar".to_string(),
            "foo.spec".to_string(),
            "bad-1.0.tar".to_string(),
        ];

        let archives = scan_archives(&reader, Path::new("."), &filenames);

        assert_eq!(archives.len(), 2);
        assert_eq!(archives[0].name, "bad-1.0.tar");
        assert!(archives[0].members.is_empty());
        assert_eq!(archives[1].name, "good-2.0.tar");
        assert_eq!(archives[1].members, vec![ArchiveMember::dir("good-2.0")]);
    }
}
