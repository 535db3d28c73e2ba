//! Error types for the pdf2xlsx library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConvertError`] — **Fatal for the operation it came from**: the input
//!   path does not exist, the bytes are not a PDF, the workbook cannot be
//!   written. Returned as `Err(ConvertError)` from the single-file entry
//!   points and from batch-level packaging.
//!
//! * [`FileError`] — **Non-fatal at the batch boundary**: one uploaded file
//!   failed (no tables, malformed PDF, write error) but the rest of the batch
//!   is fine. Stored inside [`crate::output::FileResult`] so callers can
//!   inspect partial success rather than losing the whole batch to one bad
//!   PDF.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! file failure, log and continue, or collect all errors for a post-run
//! report. The batch orchestrator always continues.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2xlsx library.
///
/// Per-file failures inside a batch use [`FileError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Failed to parse PDF '{path}': {source}")]
    PdfParse {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Neither detection mode found a table in the document.
    #[error(
        "No tables detected in '{path}'.\n\
         Try another PDF, or check that it is not a scanned image."
    )]
    NoTablesFound { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or save the output workbook.
    #[error("Failed to write workbook '{path}': {source}")]
    WorkbookWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Could not assemble the zip bundle of workbooks.
    #[error("Failed to write archive '{path}': {source}")]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Filesystem error outside the PDF/workbook/zip layers.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Shorthand for [`ConvertError::Io`] with a path attached.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A non-fatal error scoped to a single file in a batch.
///
/// Stored alongside [`crate::output::FileResult`] when a file fails.
/// The batch continues regardless; failed files are simply absent from the
/// download artifact.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileError {
    /// Neither lattice nor stream mode found a table.
    #[error("{filename}: no tables detected in either detection mode")]
    NoTablesFound { filename: String },

    /// The PDF could not be parsed or its text layer could not be read.
    #[error("{filename}: extraction failed: {detail}")]
    Extraction { filename: String, detail: String },

    /// The workbook could not be written.
    #[error("{filename}: workbook write failed: {detail}")]
    WorkbookWrite { filename: String, detail: String },

    /// Filesystem error while persisting the upload or its output.
    #[error("{filename}: I/O error: {detail}")]
    Io { filename: String, detail: String },
}

impl FileError {
    /// Demote a fatal error to a per-file one, tagging it with the filename
    /// the batch loop was working on.
    pub(crate) fn from_convert(filename: &str, err: ConvertError) -> Self {
        let filename = filename.to_string();
        match err {
            ConvertError::NoTablesFound { .. } => FileError::NoTablesFound { filename },
            ConvertError::WorkbookWrite { source, .. } => FileError::WorkbookWrite {
                filename,
                detail: source.to_string(),
            },
            ConvertError::Io { source, .. } => FileError::Io {
                filename,
                detail: source.to_string(),
            },
            other => FileError::Extraction {
                filename,
                detail: other.to_string(),
            },
        }
    }
}
