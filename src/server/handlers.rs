//! HTTP handlers: batch conversion and artifact download.

use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::convert::{convert_all, UploadedFile};
use crate::error::FileError;
use crate::output::BatchStats;
use crate::server::{ApiError, AppState, StoredRun};

/// Per-file entry in the conversion response.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub filename: String,
    pub ok: bool,
    pub tables: usize,
    pub workbook_name: Option<String>,
    pub error: Option<String>,
}

/// Download pointer included when at least one file succeeded.
#[derive(Debug, Serialize)]
pub struct DownloadEntry {
    pub run_id: Uuid,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub files: Vec<FileEntry>,
    pub stats: BatchStats,
    /// `None` means nothing was generated and there is nothing to download.
    pub download: Option<DownloadEntry>,
}

/// `POST /api/convert` — accept multipart PDF uploads, convert them all,
/// park the artifact for download.
///
/// Files that are not `.pdf` are rejected per-file, like any other per-file
/// failure; they never abort the batch.
pub async fn convert_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut uploads: Vec<UploadedFile> = Vec::new();
    let mut rejected: Vec<FileEntry> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to parse multipart data: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        if !filename.to_ascii_lowercase().ends_with(".pdf") {
            rejected.push(FileEntry {
                filename: filename.clone(),
                ok: false,
                tables: 0,
                workbook_name: None,
                error: Some(format!("{filename}: only .pdf files are accepted")),
            });
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("failed to read '{filename}': {e}")))?;
        uploads.push(UploadedFile::new(filename, bytes.to_vec()));
    }

    if uploads.is_empty() && rejected.is_empty() {
        return Err(ApiError::BadRequest(
            "no files uploaded; send one or more PDFs in the 'files' field".into(),
        ));
    }

    info!(uploads = uploads.len(), rejected = rejected.len(), "conversion request");
    let outcome = convert_all(uploads, &state.config).await?;

    let mut files: Vec<FileEntry> = outcome
        .files
        .iter()
        .map(|f| FileEntry {
            filename: f.filename.clone(),
            ok: f.is_success(),
            tables: f.tables,
            workbook_name: f.workbook_name(),
            error: f.error.as_ref().map(FileError::to_string),
        })
        .collect();
    files.extend(rejected);

    let stats = outcome.stats.clone();
    let download = outcome.artifact.as_ref().map(|artifact| {
        let run_id = Uuid::new_v4();
        let entry = DownloadEntry {
            run_id,
            file_name: artifact.download_name(),
        };
        state
            .runs
            .insert(run_id, StoredRun::new(artifact.clone(), outcome.work_dir));
        entry
    });

    Ok(Json(ConvertResponse {
        files,
        stats,
        download,
    }))
}

/// `GET /api/download/{run_id}` — stream the parked artifact.
pub async fn download(
    State(state): State<AppState>,
    Path(run_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (content_type, file_name, path) = {
        let run = state
            .runs
            .get(&run_id)
            .ok_or_else(|| ApiError::NotFound(format!("unknown download id: {run_id}")))?;
        (
            run.artifact.content_type(),
            run.artifact.download_name(),
            run.artifact.path().to_path_buf(),
        )
    };

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e).context("reading artifact")))?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::server::{router, AppState};
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;

    fn server() -> TestServer {
        let state = AppState::new(ConversionConfig::default());
        TestServer::new(router(state)).unwrap()
    }

    fn pdf_part(bytes: Vec<u8>, name: &str) -> Part {
        Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_type("application/pdf")
    }

    /// A tiny but well-formed PDF with a whitespace-aligned table.
    fn table_pdf() -> Vec<u8> {
        build_pdf(&["Name  Age", "Alice  30", "Bob  41"])
    }

    fn build_pdf(lines: &[&str]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 11.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for line in lines {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save pdf");
        bytes
    }

    #[tokio::test]
    async fn index_page_is_served() {
        let server = server();
        let response = server.get("/").await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("PDF"));
    }

    #[tokio::test]
    async fn single_success_offers_an_xlsx_download() {
        let server = server();
        let form = MultipartForm::new().add_part("files", pdf_part(table_pdf(), "tabla.pdf"));
        let response = server.post("/api/convert").multipart(form).await;
        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["stats"]["converted_files"], 1);
        let download = &body["download"];
        assert_eq!(download["file_name"], "tabla.xlsx");

        let run_id = download["run_id"].as_str().unwrap().to_string();
        let dl = server.get(&format!("/api/download/{run_id}")).await;
        dl.assert_status(StatusCode::OK);
        assert!(dl
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("spreadsheetml"));
    }

    #[tokio::test]
    async fn multiple_successes_bundle_into_a_zip() {
        let server = server();
        let form = MultipartForm::new()
            .add_part("files", pdf_part(table_pdf(), "a.pdf"))
            .add_part("files", pdf_part(table_pdf(), "b.pdf"));
        let response = server.post("/api/convert").multipart(form).await;
        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["stats"]["converted_files"], 2);
        assert_eq!(body["download"]["file_name"], "excels_convertidos.zip");

        let run_id = body["download"]["run_id"].as_str().unwrap().to_string();
        let dl = server.get(&format!("/api/download/{run_id}")).await;
        dl.assert_status(StatusCode::OK);
        assert_eq!(
            dl.headers().get("content-type").unwrap().to_str().unwrap(),
            "application/zip"
        );
    }

    #[tokio::test]
    async fn non_pdf_upload_is_rejected_per_file() {
        let server = server();
        let form = MultipartForm::new().add_part(
            "files",
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_type("text/plain"),
        );
        let response = server.post("/api/convert").multipart(form).await;
        response.assert_status(StatusCode::OK);

        let body: serde_json::Value = response.json();
        assert_eq!(body["files"][0]["ok"], false);
        assert!(body["download"].is_null());
    }

    #[tokio::test]
    async fn empty_request_is_a_bad_request() {
        let server = server();
        let response = server
            .post("/api/convert")
            .multipart(MultipartForm::new())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_run_id_is_not_found() {
        let server = server();
        let response = server
            .get(&format!("/api/download/{}", Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
