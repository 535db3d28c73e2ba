//! Configuration types for PDF-to-Excel conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs between the CLI, the web server and tests, and
//! keeps the core free of ambient state — the work directory and the legacy
//! text encoding are explicit fields here, never process-wide defaults.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a conversion run.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2xlsx::{ConversionConfig, TextEncoding};
///
/// let config = ConversionConfig::builder()
///     .encoding(TextEncoding::Utf8)
///     .min_cols(3)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Directory where uploads, workbooks and the zip bundle are written.
    ///
    /// `None` (the default) gives every batch a fresh temporary directory
    /// that lives exactly as long as the batch outcome. Setting a path keeps
    /// all outputs in that directory and never removes them.
    pub work_dir: Option<PathBuf>,

    /// Decoding fallback for PDF string bytes that are not valid UTF-8.
    /// Default: [`TextEncoding::Windows1252`].
    ///
    /// Invoices and bank statements produced on Windows frequently carry
    /// Latin-1/CP-1252 bytes in their text operators. Decoding those as UTF-8
    /// turns every accented character into U+FFFD, which then corrupts cell
    /// values. The single-byte fallback never fails, so it is the safer
    /// default; switch to `Utf8` only for documents known to be clean.
    pub encoding: TextEncoding,

    /// Minimum cells per line for a line to count as a table row. Default: 2.
    ///
    /// Raising this suppresses false positives from dense prose at the cost
    /// of missing genuine two-column tables.
    pub min_cols: usize,

    /// Upper bound on a single uploaded file, in bytes. Default: 32 MiB.
    /// Enforced by the web layer only.
    pub max_upload_bytes: u64,

    /// File name of the zip bundle produced for multi-file batches.
    /// Default: `excels_convertidos.zip`.
    pub archive_name: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            encoding: TextEncoding::Windows1252,
            min_cols: 2,
            max_upload_bytes: 32 * 1024 * 1024,
            archive_name: crate::archive::ARCHIVE_FILE_NAME.to_string(),
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = Some(dir.into());
        self
    }

    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn min_cols(mut self, n: usize) -> Self {
        self.config.min_cols = n;
        self
    }

    pub fn max_upload_bytes(mut self, n: u64) -> Self {
        self.config.max_upload_bytes = n.max(1);
        self
    }

    pub fn archive_name(mut self, name: impl Into<String>) -> Self {
        self.config.archive_name = name.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.min_cols < 2 {
            return Err(ConvertError::InvalidConfig(format!(
                "min_cols must be at least 2, got {}",
                c.min_cols
            )));
        }
        if c.archive_name.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "archive_name must not be empty".into(),
            ));
        }
        if !c.archive_name.ends_with(".zip") {
            return Err(ConvertError::InvalidConfig(format!(
                "archive_name must end with .zip, got '{}'",
                c.archive_name
            )));
        }
        Ok(self.config)
    }
}

/// Decoding fallback applied to PDF string bytes that fail strict decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Re-decode broken bytes as Windows-1252. (default)
    #[default]
    Windows1252,
    /// Keep strict UTF-8 with lossy replacement characters.
    Utf8,
}
