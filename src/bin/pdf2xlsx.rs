//! CLI binary for pdf2xlsx.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2xlsx::{convert_all_sync, ConversionConfig, TextEncoding, UploadedFile};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one PDF; the workbook lands next to it as mifactura.xlsx
  pdf2xlsx mifactura.pdf

  # Choose the output path
  pdf2xlsx informe.pdf -o tablas.xlsx

  # Convert a batch; two or more successes produce a zip bundle
  pdf2xlsx facturas/*.pdf -o excels.zip

  # Strict UTF-8 decoding instead of the Windows-1252 fallback
  pdf2xlsx --encoding utf8 documento.pdf

  # Machine-readable results
  pdf2xlsx --json facturas/*.pdf

ENVIRONMENT VARIABLES:
  PDF2XLSX_OUTPUT     Default output path
  PDF2XLSX_ENCODING   Decoding fallback (windows1252, utf8)
  PDF2XLSX_MIN_COLS   Minimum cells per table row
"#;

/// Extract tables from PDF files into Excel workbooks.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2xlsx",
    version,
    about = "Extract tables from PDF files into Excel workbooks",
    long_about = "Extract every table from one or more PDF documents into Excel workbooks, \
one sheet per table. Detection tries ruled (lattice) tables first and falls back to \
whitespace-aligned (stream) tables when a document has no ruling lines.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// One or more input PDF files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path: the .xlsx for a single input, the .zip for a batch.
    /// Defaults to a sibling of the (first) input.
    #[arg(short, long, env = "PDF2XLSX_OUTPUT")]
    output: Option<PathBuf>,

    /// Decoding fallback for non-UTF-8 text bytes.
    #[arg(long, env = "PDF2XLSX_ENCODING", value_enum, default_value = "windows1252")]
    encoding: EncodingArg,

    /// Minimum cells per line for a line to count as a table row.
    #[arg(long, env = "PDF2XLSX_MIN_COLS", default_value_t = 2)]
    min_cols: usize,

    /// Output structured JSON results instead of human-readable lines.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EncodingArg {
    Windows1252,
    Utf8,
}

impl From<EncodingArg> for TextEncoding {
    fn from(v: EncodingArg) -> Self {
        match v {
            EncodingArg::Windows1252 => TextEncoding::Windows1252,
            EncodingArg::Utf8 => TextEncoding::Utf8,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = ConversionConfig::builder()
        .encoding(cli.encoding.clone().into())
        .min_cols(cli.min_cols)
        .build()
        .context("Invalid configuration")?;

    // ── Read inputs ──────────────────────────────────────────────────────
    let mut uploads = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        uploads.push(
            UploadedFile::from_path(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?,
        );
    }

    // ── Run the batch ────────────────────────────────────────────────────
    let show_spinner = !cli.quiet && !cli.no_progress && !cli.json;
    let spinner = if show_spinner {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Converting {} file(s)…", cli.inputs.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let outcome = convert_all_sync(uploads, &config).context("Conversion failed")?;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        #[derive(serde::Serialize)]
        struct JsonReport<'a> {
            files: &'a [pdf2xlsx::FileResult],
            stats: &'a pdf2xlsx::BatchStats,
            artifact: Option<&'a pdf2xlsx::DownloadArtifact>,
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonReport {
                files: &outcome.files,
                stats: &outcome.stats,
                artifact: outcome.artifact.as_ref(),
            })
            .context("Failed to serialise results")?
        );
    } else if !cli.quiet {
        for f in &outcome.files {
            match &f.error {
                None => eprintln!(
                    "{} {} → {}  {}",
                    green("✓"),
                    f.filename,
                    f.workbook_name().unwrap_or_default(),
                    dim(&format!("{} tables, {}ms", f.tables, f.duration_ms)),
                ),
                Some(e) => eprintln!("{} {}", red("✗"), red(&e.to_string())),
            }
        }
    }

    // ── Persist the artifact outside the run directory ───────────────────
    let Some(artifact) = &outcome.artifact else {
        if !cli.quiet && !cli.json {
            eprintln!("⚠️  No workbooks were generated.");
        }
        drop(outcome);
        std::process::exit(2);
    };

    let dest = match &cli.output {
        Some(path) => path.clone(),
        None => default_output(&cli.inputs, artifact.download_name()),
    };
    std::fs::copy(artifact.path(), &dest)
        .with_context(|| format!("failed to write output to '{}'", dest.display()))?;

    if !cli.quiet && !cli.json {
        eprintln!(
            "{} {}/{} files converted in {}ms  →  {}",
            if outcome.stats.failed_files == 0 {
                green("✔")
            } else {
                bold("⚠")
            },
            outcome.stats.converted_files,
            outcome.stats.total_files,
            outcome.stats.total_duration_ms,
            bold(&dest.display().to_string()),
        );
    }

    Ok(())
}

/// With no `-o`, the artifact lands next to the first input: `a.pdf` becomes
/// `a.xlsx`, a multi-file bundle keeps the archive name.
fn default_output(inputs: &[PathBuf], artifact_name: String) -> PathBuf {
    let first = &inputs[0];
    if artifact_name.ends_with(".zip") {
        first
            .parent()
            .map(|p| p.join(&artifact_name))
            .unwrap_or_else(|| PathBuf::from(artifact_name))
    } else {
        first.with_extension("xlsx")
    }
}
