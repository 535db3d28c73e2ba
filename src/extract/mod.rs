//! The extraction adapter: PDF path in, ordered tables out.
//!
//! Detection is a capability behind the [`TableDetector`] trait so the
//! orchestrator and its tests never depend on a real PDF parser — an
//! in-memory detector substitutes cleanly. The bundled implementation,
//! [`TextLayerDetector`], reads the page text layer and ruling geometry and
//! runs one of two strategies:
//!
//! * [`DetectionMode::Lattice`] — tables bounded by drawn ruling lines
//! * [`DetectionMode::Stream`]  — tables inferred from whitespace alignment
//!
//! [`extract_tables`] applies the fixed two-pass policy on top: lattice
//! first, one stream retry only when lattice finds nothing at all. The
//! policy is deliberately sequential, not scored — there is no confidence
//! signal to arbitrate between modes, so none is invented.

mod lattice;
mod reader;
mod stream;
pub mod table;

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConversionConfig, TextEncoding};
use crate::error::ConvertError;
pub use table::DetectedTable;

/// Which table-detection strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    /// Tables bounded by visible ruling lines.
    Lattice,
    /// Tables inferred from whitespace/column alignment.
    Stream,
}

/// A table-detection capability.
pub trait TableDetector {
    /// Detect tables across all pages of the PDF at `path`, in page order.
    ///
    /// An empty result is not an error; the caller decides what emptiness
    /// means.
    fn detect(&self, path: &Path, mode: DetectionMode) -> Result<Vec<DetectedTable>, ConvertError>;
}

/// The bundled detector: lopdf + pdf-extract over the page text layer.
#[derive(Debug, Clone)]
pub struct TextLayerDetector {
    encoding: TextEncoding,
    min_cols: usize,
}

impl TextLayerDetector {
    pub fn new(encoding: TextEncoding, min_cols: usize) -> Self {
        Self { encoding, min_cols }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self::new(config.encoding, config.min_cols)
    }
}

impl TableDetector for TextLayerDetector {
    fn detect(&self, path: &Path, mode: DetectionMode) -> Result<Vec<DetectedTable>, ConvertError> {
        let pages = reader::read_pages(path, self.encoding)?;
        let tables = match mode {
            DetectionMode::Lattice => lattice::detect(&pages, self.min_cols),
            DetectionMode::Stream => stream::detect(&pages, self.min_cols),
        };
        debug!(
            path = %path.display(),
            ?mode,
            tables = tables.len(),
            "detection pass finished"
        );
        Ok(tables)
    }
}

/// Extract all tables from the PDF at `path` with the two-pass policy.
///
/// Fails fast with [`ConvertError::FileNotFound`] (or
/// [`ConvertError::NotAPdf`]) before any detection attempt. Returns an empty
/// vector when both modes find nothing; mapping emptiness to an error is the
/// orchestrator's job.
pub fn extract_tables(
    detector: &dyn TableDetector,
    path: &Path,
) -> Result<Vec<DetectedTable>, ConvertError> {
    check_input(path)?;

    let tables = detector.detect(path, DetectionMode::Lattice)?;
    if !tables.is_empty() {
        info!(path = %path.display(), tables = tables.len(), mode = "lattice", "tables detected");
        return Ok(tables);
    }

    debug!(path = %path.display(), "lattice mode found nothing, retrying in stream mode");
    let tables = detector.detect(path, DetectionMode::Stream)?;
    if !tables.is_empty() {
        info!(path = %path.display(), tables = tables.len(), mode = "stream", "tables detected");
    }
    Ok(tables)
}

/// Validate existence and the `%PDF` magic before touching a parser.
fn check_input(path: &Path) -> Result<(), ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConvertError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConvertError::io(path, e)
        }
    })?;

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(ConvertError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}
