//! Zip packaging for multi-workbook batches.
//!
//! The bundle is deflate-compressed and flat: every workbook sits at the
//! archive root under its own file name, failed inputs are simply absent.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ConvertError;

/// Default archive file name.
pub const ARCHIVE_FILE_NAME: &str = "excels_convertidos.zip";

/// Bundle `workbooks` into `dest_dir/<archive_name>` and return its path.
pub fn bundle_workbooks(
    workbooks: &[PathBuf],
    dest_dir: &Path,
    archive_name: &str,
) -> Result<PathBuf, ConvertError> {
    let dest = dest_dir.join(archive_name);
    let wrap_zip = |source: zip::result::ZipError| ConvertError::ArchiveWrite {
        path: dest.clone(),
        source,
    };

    let file = File::create(&dest).map_err(|e| ConvertError::io(&dest, e))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for workbook in workbooks {
        let name = workbook
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ConvertError::Internal(format!(
                    "workbook path has no usable file name: '{}'",
                    workbook.display()
                ))
            })?;

        writer.start_file(name, options).map_err(wrap_zip)?;
        let mut input = File::open(workbook).map_err(|e| ConvertError::io(workbook, e))?;
        io::copy(&mut input, &mut writer).map_err(|e| ConvertError::io(&dest, e))?;
    }

    writer.finish().map_err(wrap_zip)?;
    debug!(path = %dest.display(), entries = workbooks.len(), "archive written");
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap().write_all(contents).unwrap();
        path
    }

    #[test]
    fn archive_contains_exactly_the_given_workbooks() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.xlsx", b"aaa");
        let b = write_file(dir.path(), "b.xlsx", b"bbb");

        let zip_path = bundle_workbooks(&[a, b], dir.path(), ARCHIVE_FILE_NAME).unwrap();
        assert!(zip_path.ends_with(ARCHIVE_FILE_NAME));

        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a.xlsx", "b.xlsx"]);
    }

    #[test]
    fn entries_are_deflate_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.xlsx", &[0u8; 4096]);

        let zip_path = bundle_workbooks(&[a], dir.path(), ARCHIVE_FILE_NAME).unwrap();
        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
    }

    #[test]
    fn missing_workbook_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let ghost = dir.path().join("ghost.xlsx");
        let err = bundle_workbooks(&[ghost], dir.path(), ARCHIVE_FILE_NAME).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }
}
