//! Common test helper functions shared across test modules.
use flate2::{Compression, write::GzEncoder};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

fn append_entries<W: Write>(
    builder: &mut tar::Builder<W>,
    dirs: &[&str],
    files: &[&str],
) {
    for dir in dirs {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        builder
            .append_data(&mut header, dir, std::io::empty())
            .unwrap();
    }

    for file in files {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(0);
        builder
            .append_data(&mut header, file, std::io::empty())
            .unwrap();
    }
}

/// Writes a tar archive with the given directory and (empty) file entries.
///
/// Names ending in `.tar.gz` or `.tgz` are gzip compressed.
pub fn write_tarball(
    dir: &Path,
    name: &str,
    dirs: &[&str],
    files: &[&str],
) -> PathBuf {
    let path = dir.join(name);
    let file = File::create(&path).unwrap();

    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        let mut builder =
            tar::Builder::new(GzEncoder::new(file, Compression::default()));
        append_entries(&mut builder, dirs, files);
        builder.into_inner().unwrap().finish().unwrap();
    } else {
        let mut builder = tar::Builder::new(file);
        append_entries(&mut builder, dirs, files);
        builder.finish().unwrap();
    }

    path
}

/// Writes `lines` joined by newlines, without a trailing newline.
pub fn write_lines(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

/// Reads a file back as the lines it was written with.
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .split('\n')
        .map(String::from)
        .collect()
}
