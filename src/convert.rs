//! Conversion orchestration: uploads in, download artifact out.
//!
//! ## Why sequential?
//!
//! A batch processes its files strictly in upload order on one blocking
//! thread. Table detection is CPU-bound and the workloads are small (a
//! handful of user-selected PDFs), so parallelism would buy little and cost
//! deterministic ordering of results and sheet numbering. The async entry
//! points exist so the web layer never blocks a runtime worker — they wrap
//! the same loop in `spawn_blocking`.
//!
//! ## Failure model
//!
//! Everything that can go wrong with one file is caught at the per-file
//! boundary and recorded on its [`FileResult`]; one bad PDF never blocks the
//! others. Only batch-level problems (work directory creation, zip
//! assembly) surface as `Err`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::archive::bundle_workbooks;
use crate::config::ConversionConfig;
use crate::error::{ConvertError, FileError};
use crate::extract::{extract_tables, TableDetector, TextLayerDetector};
use crate::output::{BatchOutcome, BatchStats, DownloadArtifact, FileResult, RunDir};
use crate::workbook::{WorkbookWriter, XlsxWriter};

/// One uploaded file: a name and its raw bytes, consumed once.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk into an upload, keeping its file name.
    pub fn from_path(path: &Path) -> Result<Self, ConvertError> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConvertError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConvertError::io(path, e)
            }
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        Ok(Self { name, bytes })
    }
}

/// Convert a batch of uploaded files and package the results.
///
/// This is the primary entry point for the web layer.
///
/// # Returns
/// `Ok(BatchOutcome)` even when some (or all) files failed — check
/// `outcome.stats.failed_files`. The artifact is `None` only when no file
/// succeeded.
///
/// # Errors
/// Returns `Err(ConvertError)` only for batch-level failures: the work
/// directory could not be created, or the zip bundle could not be written.
pub async fn convert_all(
    files: Vec<UploadedFile>,
    config: &ConversionConfig,
) -> Result<BatchOutcome, ConvertError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_all_sync(files, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("conversion task panicked: {e}")))?
}

/// Blocking implementation of [`convert_all`].
pub fn convert_all_sync(
    files: Vec<UploadedFile>,
    config: &ConversionConfig,
) -> Result<BatchOutcome, ConvertError> {
    let batch_start = Instant::now();
    let work_dir = create_run_dir(config)?;
    info!(
        files = files.len(),
        work_dir = %work_dir.path().display(),
        "starting batch conversion"
    );

    let detector = TextLayerDetector::from_config(config);
    let writer = XlsxWriter;

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        results.push(convert_upload(&file, work_dir.path(), &detector, &writer));
    }

    let workbooks: Vec<PathBuf> = results.iter().filter_map(|r| r.workbook.clone()).collect();
    let artifact = package(&workbooks, work_dir.path(), config)?;

    let stats = BatchStats {
        total_files: results.len(),
        converted_files: workbooks.len(),
        failed_files: results.iter().filter(|r| !r.is_success()).count(),
        total_tables: results.iter().map(|r| r.tables).sum(),
        total_duration_ms: batch_start.elapsed().as_millis() as u64,
    };
    info!(
        converted = stats.converted_files,
        failed = stats.failed_files,
        duration_ms = stats.total_duration_ms,
        "batch conversion finished"
    );

    Ok(BatchOutcome {
        files: results,
        artifact,
        stats,
        work_dir,
    })
}

/// Convert a single PDF on disk into a workbook at `xlsx_path`.
///
/// This is the CLI's direct path; it shares the adapter and writer with the
/// batch loop but skips upload persistence and packaging.
///
/// # Errors
/// [`ConvertError::FileNotFound`] before any detection attempt if the input
/// is missing; [`ConvertError::NoTablesFound`] when both detection modes
/// come back empty.
pub fn convert_file_sync(
    pdf_path: &Path,
    xlsx_path: &Path,
    config: &ConversionConfig,
) -> Result<usize, ConvertError> {
    let detector = TextLayerDetector::from_config(config);
    convert_with(&detector, &XlsxWriter, pdf_path, xlsx_path)
}

/// Async wrapper around [`convert_file_sync`].
pub async fn convert_file(
    pdf_path: &Path,
    xlsx_path: &Path,
    config: &ConversionConfig,
) -> Result<usize, ConvertError> {
    let pdf = pdf_path.to_path_buf();
    let xlsx = xlsx_path.to_path_buf();
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_file_sync(&pdf, &xlsx, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("conversion task panicked: {e}")))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn create_run_dir(config: &ConversionConfig) -> Result<RunDir, ConvertError> {
    match &config.work_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| ConvertError::io(dir, e))?;
            Ok(RunDir::Persistent(dir.clone()))
        }
        None => {
            let tmp = tempfile::Builder::new()
                .prefix("pdf2xlsx-")
                .tempdir()
                .map_err(|e| ConvertError::Internal(format!("tempdir: {e}")))?;
            Ok(RunDir::Ephemeral(tmp))
        }
    }
}

/// Persist one upload and convert it, catching every error at this boundary.
fn convert_upload(
    file: &UploadedFile,
    work_dir: &Path,
    detector: &dyn TableDetector,
    writer: &dyn WorkbookWriter,
) -> FileResult {
    let start = Instant::now();
    let done = |workbook: Option<PathBuf>, tables: usize, error: Option<FileError>| FileResult {
        filename: file.name.clone(),
        workbook,
        tables,
        error,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    let pdf_path = work_dir.join(sanitize_filename(&file.name));
    if let Err(e) = std::fs::write(&pdf_path, &file.bytes) {
        warn!(file = %file.name, "failed to persist upload: {e}");
        return done(None, 0, Some(FileError::Io {
            filename: file.name.clone(),
            detail: e.to_string(),
        }));
    }

    let xlsx_path = pdf_path.with_extension("xlsx");
    match convert_with(detector, writer, &pdf_path, &xlsx_path) {
        Ok(tables) => {
            info!(file = %file.name, tables, "converted");
            done(Some(xlsx_path), tables, None)
        }
        Err(e) => {
            warn!(file = %file.name, "conversion failed: {e}");
            done(None, 0, Some(FileError::from_convert(&file.name, e)))
        }
    }
}

/// The shared extract-then-write step.
fn convert_with(
    detector: &dyn TableDetector,
    writer: &dyn WorkbookWriter,
    pdf_path: &Path,
    xlsx_path: &Path,
) -> Result<usize, ConvertError> {
    let tables = extract_tables(detector, pdf_path)?;
    if tables.is_empty() {
        return Err(ConvertError::NoTablesFound {
            path: pdf_path.to_path_buf(),
        });
    }
    writer.write(&tables, xlsx_path)?;
    Ok(tables.len())
}

/// Zero successes → no artifact; one → the workbook itself; several → zip.
fn package(
    workbooks: &[PathBuf],
    work_dir: &Path,
    config: &ConversionConfig,
) -> Result<Option<DownloadArtifact>, ConvertError> {
    match workbooks {
        [] => Ok(None),
        [only] => Ok(Some(DownloadArtifact::Workbook { path: only.clone() })),
        many => {
            let path = bundle_workbooks(many, work_dir, &config.archive_name)?;
            Ok(Some(DownloadArtifact::Archive { path }))
        }
    }
}

/// Keep only the final path component of whatever name the client sent.
fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .to_string();
    if base.is_empty() {
        "upload.pdf".to_string()
    } else {
        base
    }
}
