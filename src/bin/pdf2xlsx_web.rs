//! Web binary for pdf2xlsx: serves the upload page and the conversion API.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2xlsx::server::{router, AppState};
use pdf2xlsx::{ConversionConfig, TextEncoding};
use std::io;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Serve the PDF → Excel conversion UI.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2xlsx-web",
    version,
    about = "Serve the PDF → Excel conversion web UI"
)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "PDF2XLSX_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Decoding fallback for non-UTF-8 text bytes.
    #[arg(long, env = "PDF2XLSX_ENCODING", value_enum, default_value = "windows1252")]
    encoding: EncodingArg,

    /// Minimum cells per line for a line to count as a table row.
    #[arg(long, env = "PDF2XLSX_MIN_COLS", default_value_t = 2)]
    min_cols: usize,

    /// Upper bound on one uploaded file, in MiB.
    #[arg(long, env = "PDF2XLSX_MAX_UPLOAD_MIB", default_value_t = 32)]
    max_upload_mib: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,
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

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let config = ConversionConfig::builder()
        .encoding(cli.encoding.clone().into())
        .min_cols(cli.min_cols)
        .max_upload_bytes(cli.max_upload_mib * 1024 * 1024)
        .build()
        .context("Invalid configuration")?;

    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    tracing::info!("listening on http://{}", cli.bind);

    axum::serve(listener, app)
        .await
        .context("server terminated")?;
    Ok(())
}
