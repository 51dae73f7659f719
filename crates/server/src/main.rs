//! finsheet REST API server
//!
//! Accepts balance-sheet images as a multipart upload and answers with the
//! run report as JSON.

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use core_pipeline::{
    OcrConfig, Pipeline, PipelineConfig, RunReport, TesseractExtractor, TextExtractor, Upload,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline<Box<dyn TextExtractor>>>,
}

fn config_from_env() -> PipelineConfig {
    let mut ocr = OcrConfig::default();
    if let Ok(language) = std::env::var("FINSHEET_LANG") {
        ocr.language = language;
    }
    ocr.data_path = std::env::var_os("FINSHEET_TESSDATA").map(PathBuf::from);
    PipelineConfig {
        ocr,
        ..PipelineConfig::default()
    }
}

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = config_from_env();
    let extractor: Box<dyn TextExtractor> = Box::new(TesseractExtractor::new(config.ocr.clone()));
    let state = Arc::new(AppState {
        pipeline: Arc::new(Pipeline::new(extractor, config)),
    });

    let addr = std::env::var("FINSHEET_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await.context("Server error")
}

async fn health_check() -> &'static str {
    "OK"
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<RunReport>, (StatusCode, String)> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        // Plain form fields carry no image
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(bad_request)?;
        uploads.push(Upload::new(name, bytes.to_vec()));
    }
    tracing::info!(images = uploads.len(), "analysis requested");

    // OCR blocks; keep it off the async workers
    let pipeline = Arc::clone(&state.pipeline);
    let report = tokio::task::spawn_blocking(move || pipeline.run(&uploads))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(report))
}

fn bad_request(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use core_pipeline::PipelineError;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "finsheet-test-boundary";

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract_text(&self, _image: &DynamicImage) -> Result<String, PipelineError> {
            Ok(self.0.to_string())
        }
    }

    fn test_app(text: &'static str) -> Router {
        let extractor: Box<dyn TextExtractor> = Box::new(FixedText(text));
        app(Arc::new(AppState {
            pipeline: Arc::new(Pipeline::new(extractor, PipelineConfig::default())),
        }))
    }

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::from_pixel(4, 4, Rgb([255u8, 255u8, 255u8]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn multipart_body(files: &[(&str, Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\n\
                     Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                     Content-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_analyze(app: Router, body: Vec<u8>, content_type: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_app("")
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_analyze_returns_report() {
        let body = multipart_body(&[("q1.png", png_bytes()), ("q2.png", png_bytes())]);
        let (status, bytes) = post_analyze(
            test_app("Acme, 200, 100, 50, 500\nBeta, 100, 100, 25, 100"),
            body,
            &format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let report: RunReport = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(report.images.len(), 2);
        assert_eq!(report.images[0].label, "q1.png");
        let best = report.overall_best.unwrap();
        assert_eq!(best.sheet, "q1.png");
        assert_eq!(best.row.record.company, "Beta");
    }

    #[tokio::test]
    async fn test_analyze_without_files() {
        let (status, bytes) = post_analyze(
            test_app("Acme, 200, 100, 50, 500"),
            multipart_body(&[]),
            &format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let report: RunReport = serde_json::from_slice(&bytes).unwrap();
        assert!(report.images.is_empty());
        assert!(report.overall_best.is_none());
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_multipart() {
        let (status, _) =
            post_analyze(test_app(""), b"{}".to_vec(), "application/json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
