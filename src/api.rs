//! HTTP surface for automation pipelines.
//!
//! Every route is pinned to exactly one publisher pipeline:
//!
//! | Method | Path | Input |
//! |--------|------|-------|
//! | `GET`  | `/` | liveness greeting |
//! | `POST` | `/crawl-json/dantri`, `/crawl-json/tuoitre` | `{"data": "<html>"}` |
//! | `POST` | `/crawl/dantri`, `/crawl/tuoitre` | multipart upload, field `file`, `text/html` |
//!
//! Successful responses are `{"message": ..., "data": [ArticleRecord]}`; an
//! empty result is still a `200`. Errors are `{"detail": ...}` with a 4xx
//! status for bad input, `413` for oversized documents and `500` when the
//! extraction task itself fails.
//!
//! Extraction runs on the blocking pool so large documents never stall the
//! async workers, and a panic inside the pipeline surfaces as a `500` instead
//! of tearing down the connection.

use crate::models::ArticleRecord;
use crate::scrapers::{Catalog, Publisher};
use crate::utils::{describe_window, is_html_content_type};
use axum::Json;
use axum::Router;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

/// Room for JSON quoting and multipart framing on top of the raw HTML limit.
const ENVELOPE_OVERHEAD: usize = 64 * 1024;

/// Shared, read-only state for every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub max_html_bytes: usize,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, max_html_bytes: usize) -> Self {
        Self { catalog, max_html_bytes }
    }
}

/// JSON input mode: the HTML document as a string.
#[derive(Debug, Deserialize, Serialize)]
pub struct HtmlPayload {
    pub data: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CrawlResponse {
    pub message: String,
    pub data: Vec<ArticleRecord>,
}

/// Errors returned to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid file type `{0}`. Please upload an HTML file.")]
    UnsupportedContentType(String),

    #[error("Missing `file` field in multipart upload.")]
    MissingFile,

    #[error("Uploaded file is not valid UTF-8.")]
    InvalidEncoding,

    #[error("HTML document of {size} bytes exceeds the {limit} byte limit.")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedContentType(_) | ApiError::MissingFile | ApiError::InvalidEncoding => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Multipart(e) => e.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "Request failed");
        } else {
            warn!(%status, error = %self, "Request rejected");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.max_html_bytes.saturating_add(ENVELOPE_OVERHEAD);
    Router::new()
        .route("/", get(root))
        .route("/crawl-json/dantri", post(crawl_dantri_json))
        .route("/crawl-json/tuoitre", post(crawl_tuoitre_json))
        .route("/crawl/dantri", post(crawl_dantri_file))
        .route("/crawl/tuoitre", post(crawl_tuoitre_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the news crawler API." }))
}

async fn crawl_dantri_json(
    State(state): State<AppState>,
    Json(payload): Json<HtmlPayload>,
) -> Result<Json<CrawlResponse>, ApiError> {
    crawl(state, Publisher::Dantri, payload.data).await
}

async fn crawl_tuoitre_json(
    State(state): State<AppState>,
    Json(payload): Json<HtmlPayload>,
) -> Result<Json<CrawlResponse>, ApiError> {
    crawl(state, Publisher::Tuoitre, payload.data).await
}

async fn crawl_dantri_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CrawlResponse>, ApiError> {
    let html = read_html_upload(multipart).await?;
    crawl(state, Publisher::Dantri, html).await
}

async fn crawl_tuoitre_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CrawlResponse>, ApiError> {
    let html = read_html_upload(multipart).await?;
    crawl(state, Publisher::Tuoitre, html).await
}

/// Pull the `file` field out of a multipart body, insisting on `text/html`.
async fn read_html_upload(mut multipart: Multipart) -> Result<String, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_html_content_type(&content_type) {
            return Err(ApiError::UnsupportedContentType(content_type));
        }
        let bytes = field.bytes().await?;
        return String::from_utf8(bytes.to_vec()).map_err(|_| ApiError::InvalidEncoding);
    }
    Err(ApiError::MissingFile)
}

#[instrument(level = "info", skip(state, html), fields(bytes = html.len()))]
async fn crawl(state: AppState, publisher: Publisher, html: String) -> Result<Json<CrawlResponse>, ApiError> {
    if html.len() > state.max_html_bytes {
        return Err(ApiError::PayloadTooLarge {
            size: html.len(),
            limit: state.max_html_bytes,
        });
    }

    let extractor = Arc::clone(state.catalog.get(publisher));
    let window_minutes = extractor.window().length().num_minutes();
    let records = run_blocking(move || extractor.extract(&html)).await?;

    info!(count = records.len(), "Crawl request served");
    let message = if records.is_empty() {
        format!("No new articles found in the last {}.", describe_window(window_minutes))
    } else {
        format!("Found {} new articles.", records.len())
    };
    Ok(Json(CrawlResponse { message, data: records }))
}

/// Run an extraction job on the blocking pool; a panic inside it becomes [`ApiError::Internal`].
async fn run_blocking<F>(job: F) -> Result<Vec<ArticleRecord>, ApiError>
where
    F: FnOnce() -> Vec<ArticleRecord> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, header};
    use chrono::{Duration, FixedOffset, Utc};
    use tower::ServiceExt;

    const BOUNDARY: &str = "vn-headlines-boundary";

    fn app(max_html_bytes: usize) -> Router {
        let catalog = Catalog::from_config(&AppConfig::default()).unwrap();
        router(AppState::new(Arc::new(catalog), max_html_bytes))
    }

    /// A Tuổi Trẻ link published `minutes_ago` minutes before now.
    fn fresh_tuoitre_page(minutes_ago: i64) -> String {
        let vn = FixedOffset::east_opt(7 * 3600).unwrap();
        let stamp = (Utc::now().with_timezone(&vn) - Duration::minutes(minutes_ago)).format("%Y%m%d%H%M%S");
        format!(r#"<a class="box-category-link-title" href="/tin-{stamp}123.htm" title="Tin mới">Tin mới</a>"#)
    }

    fn json_request(uri: &str, html: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "data": html }).to_string()))
            .unwrap()
    }

    fn upload_request(uri: &str, content_type: &str, body: &[u8]) -> Request<Body> {
        upload_field_request(uri, "file", content_type, body)
    }

    fn upload_field_request(uri: &str, field: &str, content_type: &str, body: &[u8]) -> Request<Body> {
        let mut multipart = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"page.html\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        multipart.extend_from_slice(body);
        multipart.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart))
            .unwrap()
    }

    async fn read_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let response = app(1024)
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(read_json(response).await["message"].is_string());
    }

    #[tokio::test]
    async fn test_json_route_finds_fresh_article() {
        let response = app(1024 * 1024)
            .oneshot(json_request("/crawl-json/tuoitre", &fresh_tuoitre_page(5)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["message"], "Found 1 new articles.");
        assert_eq!(body["data"][0]["title"], "Tin mới");
        assert!(body["data"][0]["link"].as_str().unwrap().starts_with("https://tuoitre.vn/tin-"));
    }

    #[tokio::test]
    async fn test_json_route_is_pinned_to_its_publisher() {
        // Dân Trí's profile never matches the Tuổi Trẻ class, but its brute-force
        // scan does, so the link is resolved against the Dân Trí origin.
        let response = app(1024 * 1024)
            .oneshot(json_request("/crawl-json/dantri", &fresh_tuoitre_page(5)))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert!(body["data"][0]["link"].as_str().unwrap().starts_with("https://dantri.com.vn/"));
    }

    #[tokio::test]
    async fn test_empty_result_is_success() {
        let response = app(1024)
            .oneshot(json_request("/crawl-json/dantri", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json(response).await;
        assert_eq!(body["message"], "No new articles found in the last 2 hours.");
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_data_field_is_client_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/crawl-json/dantri")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"html": "<p>x</p>"}"#))
            .unwrap();
        let response = app(1024).oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_oversized_document_rejected() {
        let html = "x".repeat(2048);
        let response = app(1024)
            .oneshot(json_request("/crawl-json/dantri", &html))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(read_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_upload_route_accepts_html() {
        let page = fresh_tuoitre_page(30);
        let response = app(1024 * 1024)
            .oneshot(upload_request("/crawl/tuoitre", "text/html; charset=utf-8", page.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_route_rejects_other_content_types() {
        let response = app(1024 * 1024)
            .oneshot(upload_request("/crawl/dantri", "application/pdf", b"%PDF-1.7"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("application/pdf"));
    }

    #[tokio::test]
    async fn test_upload_route_rejects_invalid_utf8() {
        let response = app(1024 * 1024)
            .oneshot(upload_request("/crawl/dantri", "text/html", &[0x3c, 0x61, 0xff, 0xfe]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_bad_request() {
        let page = fresh_tuoitre_page(5);
        let response = app(1024 * 1024)
            .oneshot(upload_field_request("/crawl/tuoitre", "document", "text/html", page.as_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["detail"], "Missing `file` field in multipart upload.");
    }

    #[tokio::test]
    async fn test_panicking_extraction_is_internal_error() {
        let err = run_blocking(|| panic!("selector engine exploded")).await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json(response).await;
        assert!(body["detail"].as_str().unwrap().starts_with("Internal server error: "));
    }

    #[tokio::test]
    async fn test_panicking_handler_through_router_is_500() {
        async fn exploding() -> Result<Json<CrawlResponse>, ApiError> {
            let data = run_blocking(|| panic!("boom")).await?;
            Ok(Json(CrawlResponse { message: String::new(), data }))
        }
        let response = Router::new()
            .route("/explode", post(exploding))
            .oneshot(Request::builder().method("POST").uri("/explode").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(read_json(response).await["detail"].as_str().unwrap().starts_with("Internal server error: "));
    }
}
