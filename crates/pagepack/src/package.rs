//! Deterministic packaging
//!
//! Turns a finished working directory into a zip archive whose bytes
//! depend only on the directory's contents: entries are written in sorted
//! relative-path order with a fixed timestamp and fixed permissions, so
//! repeated runs over unchanged input reproduce the archive exactly.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::archive::WorkDir;
use crate::error::ArchiveError;

/// Package a working directory into a predictable zip archive
///
/// Consumes the directory: this is the hand-off point after which the
/// bundle exists only as the returned archive. The working directory is
/// removed once its contents are written out.
pub fn create_predictable_zip(work: WorkDir) -> Result<PathBuf, ArchiveError> {
    let root = work.path().to_path_buf();

    let mut entries = Vec::new();
    collect_files(&root, &root, &mut entries)?;
    entries.sort();

    let (file, archive_path) = tempfile::Builder::new()
        .prefix("pagepack-")
        .suffix(".zip")
        .tempfile()?
        .keep()
        .map_err(|e| ArchiveError::Io(e.error))?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    for relative in &entries {
        let name = relative.to_string_lossy().replace('\\', "/");
        zip.start_file(name, options)?;
        zip.write_all(&fs::read(root.join(relative))?)?;
    }
    zip.finish()?;

    debug!(archive = %archive_path.display(), files = entries.len(), "packaged bundle");
    drop(work);
    Ok(archive_path)
}

/// Collect file paths under `dir`, relative to `root`
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ArchiveError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            out.push(relative.to_path_buf());
        }
    }
    Ok(())
}
