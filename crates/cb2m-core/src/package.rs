//! Jar packaging of compiler output.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{Error, Result};

/// Pack every regular file under `output_dir` into a zip (jar) archive.
///
/// Entry names are `/`-separated paths relative to `output_dir`, written in
/// lexicographic order with a fixed timestamp and fixed permissions, so the
/// same directory contents always produce the same bytes.
///
/// # Errors
/// Returns [`Error::PackagingFailed`] if the directory is unreadable or
/// contains no files.
pub fn pack(output_dir: &Path) -> Result<Vec<u8>> {
    let mut files = collect_files(output_dir)?;
    if files.is_empty() {
        return Err(Error::PackagingFailed(format!(
            "compiler produced no output in {}",
            output_dir.display()
        )));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, path) in &files {
        let data = fs::read(path)
            .map_err(|e| Error::PackagingFailed(format!("cannot read {}: {}", path.display(), e)))?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| Error::PackagingFailed(format!("cannot add {}: {}", name, e)))?;
        zip.write_all(&data)
            .map_err(|e| Error::PackagingFailed(format!("cannot write {}: {}", name, e)))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| Error::PackagingFailed(format!("cannot finish archive: {}", e)))?;

    tracing::debug!("Packed {} file(s) from {}", files.len(), output_dir.display());
    Ok(cursor.into_inner())
}

/// Regular files below `dir` as `(entry name, path)` pairs.
fn collect_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            Error::PackagingFailed(format!("cannot read {}: {}", dir.display(), e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| Error::PackagingFailed(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.push((name, entry.into_path()));
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn class_tree() -> TempDir {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let pkg = temp.path().join("io").join("codebottle").join("alice");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("Foo.class"), [0xCA, 0xFE, 0xBA, 0xBE, 1]).unwrap();
        fs::write(pkg.join("Foo$Inner.class"), [0xCA, 0xFE, 0xBA, 0xBE, 2]).unwrap();
        fs::write(temp.path().join("Top.class"), [0xCA, 0xFE, 0xBA, 0xBE, 3]).unwrap();
        temp
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect::<Vec<_>>()
    }

    #[test]
    fn test_pack_is_deterministic() {
        let tree = class_tree();
        let first = pack(tree.path()).unwrap();
        let second = pack(tree.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_entries_use_relative_sorted_paths() {
        let tree = class_tree();
        let bytes = pack(tree.path()).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let in_order: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            in_order,
            vec![
                "Top.class",
                "io/codebottle/alice/Foo$Inner.class",
                "io/codebottle/alice/Foo.class",
            ]
        );
        assert_eq!(entry_names(&bytes).len(), 3);
    }

    #[test]
    fn test_empty_output_fails() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(temp.path().join("empty-subdir")).unwrap();

        let err = pack(temp.path()).unwrap_err();
        assert!(matches!(err, Error::PackagingFailed(_)));
    }

    #[test]
    fn test_missing_output_fails() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let err = pack(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::PackagingFailed(_)));
    }
}
