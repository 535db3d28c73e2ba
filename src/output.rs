//! Result types produced by a conversion run.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::FileError;

/// Outcome for one input file of a batch.
///
/// Success and failure live side by side in the batch result — a failed file
/// never aborts the run, it just carries its error here.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// Original upload name, e.g. `factura.pdf`.
    pub filename: String,
    /// Path of the generated workbook; `None` on failure.
    pub workbook: Option<PathBuf>,
    /// Number of tables written to the workbook; 0 on failure.
    pub tables: usize,
    /// The per-file error, when the file failed.
    pub error: Option<FileError>,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
}

impl FileResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// File name of the generated workbook, e.g. `factura.xlsx`.
    pub fn workbook_name(&self) -> Option<String> {
        self.workbook
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }
}

/// Aggregate counters for one batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub converted_files: usize,
    pub failed_files: usize,
    pub total_tables: usize,
    pub total_duration_ms: u64,
}

/// The downloadable output of a run: a single workbook when exactly one file
/// succeeded, a zip bundle when several did. Zero successes produce no
/// artifact at all.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadArtifact {
    Workbook { path: PathBuf },
    Archive { path: PathBuf },
}

impl DownloadArtifact {
    pub fn path(&self) -> &Path {
        match self {
            DownloadArtifact::Workbook { path } => path,
            DownloadArtifact::Archive { path } => path,
        }
    }

    /// The file name offered to the browser/CLI user.
    pub fn download_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string())
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DownloadArtifact::Workbook { .. } => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            DownloadArtifact::Archive { .. } => "application/zip",
        }
    }
}

/// The directory a run writes into.
///
/// Ephemeral runs own a `TempDir` whose contents (uploads, workbooks, the
/// zip) live exactly as long as this value; a persistent run writes into a
/// caller-provided directory and never removes anything.
#[derive(Debug)]
pub enum RunDir {
    Ephemeral(TempDir),
    Persistent(PathBuf),
}

impl RunDir {
    pub fn path(&self) -> &Path {
        match self {
            RunDir::Ephemeral(dir) => dir.path(),
            RunDir::Persistent(path) => path,
        }
    }
}

/// Everything a batch produced.
///
/// Holds the [`RunDir`] guard: dropping the outcome of an ephemeral run
/// deletes the work directory along with every path the outcome points at.
#[derive(Debug)]
pub struct BatchOutcome {
    pub files: Vec<FileResult>,
    pub artifact: Option<DownloadArtifact>,
    pub stats: BatchStats,
    pub work_dir: RunDir,
}

impl BatchOutcome {
    /// Paths of the successfully generated workbooks, in upload order.
    pub fn workbooks(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter_map(|f| f.workbook.as_deref())
            .collect()
    }
}
