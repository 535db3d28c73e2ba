//! # pdf2xlsx
//!
//! Extract tabular data from PDF documents into Excel workbooks.
//!
//! ## Why this crate?
//!
//! Generic PDF-to-text tools flatten tables into prose, losing the row and
//! column structure that made the data useful. This crate detects the tables
//! themselves — first from drawn ruling lines, then from whitespace
//! alignment — and writes each one to its own spreadsheet sheet, ready for
//! filtering and formulas.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDFs (upload / path)
//!  │
//!  ├─ 1. Persist   each file to a per-run work directory
//!  ├─ 2. Detect    lattice mode (ruling lines), stream-mode retry on empty
//!  ├─ 3. Write     one workbook per file, one sheet per table (Tabla_<n>)
//!  └─ 4. Package   0 → nothing, 1 → the workbook, many → deflate zip
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2xlsx::{convert_all, ConversionConfig, UploadedFile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let files = vec![UploadedFile::from_path("factura.pdf".as_ref())?];
//!     let outcome = convert_all(files, &config).await?;
//!     for f in &outcome.files {
//!         match &f.error {
//!             None => println!("✅ {} → {} tables", f.filename, f.tables),
//!             Some(e) => println!("❌ {}: {e}", f.filename),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `pdf2xlsx` binary (clap + anyhow + indicatif) |
//! | `server` | on      | Enables the `pdf2xlsx-web` binary and the axum upload UI |
//!
//! Disable both when using only the library:
//! ```toml
//! pdf2xlsx = { version = "0.3", default-features = false }
//! ```
//!
//! Failed files never abort a batch: each [`output::FileResult`] carries its
//! own success or [`error::FileError`], and the download artifact contains
//! exactly the workbooks that succeeded.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod output;
#[cfg(feature = "server")]
pub mod server;
pub mod workbook;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, TextEncoding};
pub use convert::{convert_all, convert_all_sync, convert_file, convert_file_sync, UploadedFile};
pub use error::{ConvertError, FileError};
pub use extract::{extract_tables, DetectedTable, DetectionMode, TableDetector, TextLayerDetector};
pub use output::{BatchOutcome, BatchStats, DownloadArtifact, FileResult};
pub use workbook::{sheet_name, WorkbookWriter, XlsxWriter};
