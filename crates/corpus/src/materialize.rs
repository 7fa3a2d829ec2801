//! The idempotent unzip: extract only when the destination looks incomplete.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::archive;
use crate::error::{CorpusError, Result};

/// What "already materialized" means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletenessCheck {
    /// Every archive entry name is present in the destination's top level.
    #[default]
    Names,
    /// As `Names`, and every file entry has the same size on disk.
    Sizes,
}

/// Outcome of [`ensure_materialized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterializeReport {
    pub extracted: bool,
    pub archives: usize,
    pub entries: usize,
}

/// Create `dir` (single level) when it is missing.
pub fn ensure_directory_exists(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }

    tracing::info!(dir = %dir.display(), "creating destination directory");
    fs::create_dir(dir).map_err(|e| CorpusError::io(dir, e))
}

/// Union of the entry names of every archive directly inside `source_dir`.
pub fn archive_set(source_dir: &Path) -> Result<BTreeSet<String>> {
    require_source(source_dir)?;

    let mut names = BTreeSet::new();
    for path in archive::list_archives(source_dir)? {
        names.extend(archive::read_entries(&path)?.into_iter().map(|e| e.name));
    }
    Ok(names)
}

/// Names present directly inside `dest_dir`.
pub fn destination_listing(dest_dir: &Path) -> Result<BTreeSet<String>> {
    let read_dir = fs::read_dir(dest_dir).map_err(|e| CorpusError::io(dest_dir, e))?;

    let mut names = BTreeSet::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| CorpusError::io(dest_dir, e))?;
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Name-only completeness check. See [`is_materialized_with`].
pub fn is_materialized(source_dir: &Path, dest_dir: &Path) -> Result<bool> {
    is_materialized_with(source_dir, dest_dir, CompletenessCheck::Names)
}

/// Whether every entry of every archive in `source_dir` is already present
/// at the top level of `dest_dir`.
///
/// Fails with [`CorpusError::NotFound`] when `source_dir` is missing. Creates
/// `dest_dir` when it is missing, so this is not a pure query. A source with
/// no archives is always materialized.
pub fn is_materialized_with(
    source_dir: &Path,
    dest_dir: &Path,
    check: CompletenessCheck,
) -> Result<bool> {
    require_source(source_dir)?;
    ensure_directory_exists(dest_dir)?;

    let archives = archive::list_archives(source_dir)?;
    let mut entries = Vec::new();
    for path in &archives {
        entries.extend(archive::read_entries(path)?);
    }

    let listing = destination_listing(dest_dir)?;
    let missing: Vec<&str> = entries
        .iter()
        .map(|e| e.name.as_str())
        .filter(|name| !listing.contains(*name))
        .collect();

    if !missing.is_empty() {
        tracing::debug!(
            dest = %dest_dir.display(),
            missing = missing.len(),
            first = missing[0],
            "destination is missing archive entries"
        );
        return Ok(false);
    }

    if check == CompletenessCheck::Sizes {
        for entry in entries.iter().filter(|e| !e.is_dir) {
            let on_disk = dest_dir.join(&entry.name);
            let len = match fs::metadata(&on_disk) {
                Ok(meta) if meta.is_file() => meta.len(),
                Ok(_) => return Ok(false),
                // Listed but unreadable, e.g. a dangling symlink.
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
                Err(e) => return Err(CorpusError::io(on_disk, e)),
            };
            if len != entry.size {
                tracing::debug!(
                    entry = %entry.name,
                    expected = entry.size,
                    actual = len,
                    "extracted file size differs from archive entry"
                );
                return Ok(false);
            }
        }
    }

    Ok(true)
}

/// Name-only variant of [`ensure_materialized_with`].
pub fn ensure_materialized(source_dir: &Path, dest_dir: &Path) -> Result<MaterializeReport> {
    ensure_materialized_with(source_dir, dest_dir, CompletenessCheck::Names)
}

/// Extract every archive of `source_dir` into `dest_dir` unless the
/// completeness check already holds.
///
/// Archives are extracted in file-name order; on colliding entry names the
/// last archive wins. The result is not re-verified.
pub fn ensure_materialized_with(
    source_dir: &Path,
    dest_dir: &Path,
    check: CompletenessCheck,
) -> Result<MaterializeReport> {
    if is_materialized_with(source_dir, dest_dir, check)? {
        tracing::info!(
            source = %source_dir.display(),
            dest = %dest_dir.display(),
            "corpus already materialized; skipping extraction"
        );
        return Ok(MaterializeReport::default());
    }

    let mut report = MaterializeReport {
        extracted: true,
        ..MaterializeReport::default()
    };
    for path in archive::list_archives(source_dir)? {
        report.entries += archive::extract(&path, dest_dir)?;
        report.archives += 1;
    }

    tracing::info!(
        source = %source_dir.display(),
        dest = %dest_dir.display(),
        archives = report.archives,
        entries = report.entries,
        "corpus materialized"
    );

    Ok(report)
}

fn require_source(source_dir: &Path) -> Result<()> {
    if source_dir.exists() {
        Ok(())
    } else {
        Err(CorpusError::NotFound {
            path: source_dir.to_path_buf(),
        })
    }
}
