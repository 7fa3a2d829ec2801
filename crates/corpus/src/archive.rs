//! Reading and extracting the `.zip` files of a source directory.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{CorpusError, Result};

/// Literal, case-sensitive suffix that marks a file as an archive.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// A single named entry inside an archive, as stored in its central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name, e.g. `x.xml`, `dir/` or `dir/y.xml`
    pub name: String,
    /// Uncompressed size in bytes
    pub size: u64,
    pub is_dir: bool,
}

/// Regular files directly inside `source_dir` whose name ends in `.zip`,
/// sorted by file name.
pub fn list_archives(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(source_dir).map_err(|e| CorpusError::io(source_dir, e))?;

    let mut archives = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| CorpusError::io(source_dir, e))?;
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(ARCHIVE_EXTENSION) {
            continue;
        }

        let path = entry.path();
        if path.is_file() {
            archives.push(path);
        } else {
            tracing::debug!(path = %path.display(), "skipping non-file with archive suffix");
        }
    }

    archives.sort();
    Ok(archives)
}

fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| CorpusError::io(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| CorpusError::archive(path, e))
}

/// List every entry of the archive at `path` without decompressing anything.
pub fn read_entries(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut archive = open(path)?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive
            .by_index_raw(i)
            .map_err(|e| CorpusError::archive(path, e))?;
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            size: file.size(),
            is_dir: file.is_dir(),
        });
    }

    Ok(entries)
}

/// Extract every entry of the archive at `path` into `dest_dir`.
///
/// Existing files with the same name are overwritten. Entry paths that
/// would escape `dest_dir` are rejected by the zip reader. Returns the
/// number of entries in the archive.
pub fn extract(path: &Path, dest_dir: &Path) -> Result<usize> {
    let mut archive = open(path)?;
    let count = archive.len();

    archive
        .extract(dest_dir)
        .map_err(|e| CorpusError::archive(path, e))?;

    tracing::debug!(
        archive = %path.display(),
        dest = %dest_dir.display(),
        entries = count,
        "archive extracted"
    );

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in files {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, SimpleFileOptions::default())
                    .unwrap();
            } else {
                writer
                    .start_file(*name, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(contents).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn lists_only_zip_suffixed_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_zip(&dir.path().join("b.zip"), &[("b.xml", b"b")]);
        write_zip(&dir.path().join("a.zip"), &[("a.xml", b"a")]);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("upper.ZIP"), "ignored").unwrap();
        fs::create_dir(dir.path().join("folder.zip")).unwrap();

        let archives = list_archives(dir.path()).unwrap();

        assert_eq!(
            archives,
            vec![dir.path().join("a.zip"), dir.path().join("b.zip")]
        );
    }

    #[test]
    fn reads_entry_names_sizes_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_zip(&path, &[("x.xml", b"12345"), ("texts/", b"")]);

        let entries = read_entries(&path).unwrap();

        assert_eq!(
            entries,
            vec![
                ArchiveEntry {
                    name: "x.xml".to_string(),
                    size: 5,
                    is_dir: false,
                },
                ArchiveEntry {
                    name: "texts/".to_string(),
                    size: 0,
                    is_dir: true,
                },
            ]
        );
    }

    #[test]
    fn corrupt_archive_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        fs::write(&path, "this is not a zip file").unwrap();

        let err = read_entries(&path).unwrap_err();

        assert!(matches!(err, CorpusError::Archive { ref path, .. } if path.ends_with("broken.zip")));
    }

    #[test]
    fn extract_preserves_internal_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("x.xml"), "stale").unwrap();

        let path = dir.path().join("a.zip");
        write_zip(&path, &[("x.xml", b"fresh"), ("nested/y.xml", b"y")]);

        let count = extract(&path, &dest).unwrap();

        assert_eq!(count, 2);
        assert_eq!(fs::read_to_string(dest.join("x.xml")).unwrap(), "fresh");
        assert_eq!(fs::read_to_string(dest.join("nested/y.xml")).unwrap(), "y");
    }
}
