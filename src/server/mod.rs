//! The web surface: a single-page upload UI over two JSON/binary endpoints.
//!
//! ```text
//! GET  /                       embedded index.html
//! POST /api/convert            multipart PDFs → per-file results + run id
//! GET  /api/download/{run_id}  the run's artifact (xlsx or zip)
//! ```
//!
//! Conversion runs inside the request that uploaded the files; the page shows
//! a spinner until the response arrives. The resulting artifact is parked in
//! an in-memory run registry so the download link works for as long as the
//! server (and therefore the run's temp directory) lives.

mod assets;
mod error;
mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use dashmap::DashMap;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::ConversionConfig;
use crate::output::{DownloadArtifact, RunDir};

pub use error::ApiError;

/// A finished run parked for download.
///
/// Holding the [`RunDir`] keeps an ephemeral run's temp directory — and with
/// it the artifact file — alive until the run is dropped from the registry.
#[derive(Debug)]
pub struct StoredRun {
    pub artifact: DownloadArtifact,
    _work_dir: RunDir,
}

impl StoredRun {
    pub fn new(artifact: DownloadArtifact, work_dir: RunDir) -> Self {
        Self {
            artifact,
            _work_dir: work_dir,
        }
    }
}

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ConversionConfig,
    pub runs: Arc<DashMap<Uuid, StoredRun>>,
}

impl AppState {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            runs: Arc::new(DashMap::new()),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes as usize;
    Router::new()
        .route("/", get(assets::serve_index))
        .route("/api/convert", post(handlers::convert_batch))
        .route("/api/download/{run_id}", get(handlers::download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
