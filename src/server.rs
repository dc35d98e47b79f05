use crate::config::Config;
use crate::engines;
use crate::error::PlateError;
use crate::plate::PlateResult;
use crate::preprocessing::PipelineOptions;
use crate::reader::PlateReader;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Multipart overhead allowed on top of the configured file size
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<PlateReader>,
    pub config: Arc<Config>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub engine_description: String,
    pub preprocessing: PipelineOptions,
    pub max_file_size_bytes: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let recognizer = engines::create_recognizer(&config)?;
    let reader = PlateReader::new(recognizer, config.preprocessing);
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        reader: Arc::new(reader),
        config: Arc::new(config),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + MULTIPART_OVERHEAD;

    Router::new()
        .route("/recognize-plate/", post(handle_recognize_plate))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle plate recognition requests
async fn handle_recognize_plate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PlateResult>, PlateError> {
    let max_file_size = state.config.max_file_size;
    let mut file_data: Option<Bytes> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to parse multipart", max_file_size))?
    {
        if field.name() == Some("file") {
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read file data", max_file_size))?,
            );
        }
    }

    let data = file_data.ok_or(PlateError::MissingFile)?;

    if data.len() > max_file_size {
        return Err(PlateError::ImageTooLarge {
            size: data.len(),
            max: max_file_size,
        });
    }

    // OCR is CPU bound; keep it off the async workers
    let reader = state.reader.clone();
    let result = tokio::task::spawn_blocking(move || reader.read(&data))
        .await
        .map_err(|e| PlateError::Internal(format!("Recognition task failed: {}", e)))??;

    Ok(Json(result))
}

/// Body-limit hits surface as multipart errors; keep them a 413
fn multipart_error(err: MultipartError, context: &str, max_file_size: usize) -> PlateError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PlateError::UploadTooLarge { max: max_file_size }
    } else {
        PlateError::InvalidRequest(format!("{}: {}", context, err))
    }
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let recognizer = state.reader.recognizer();
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: recognizer.name().to_string(),
        engine_description: recognizer.description().to_string(),
        preprocessing: state.reader.options(),
        max_file_size_bytes: state.config.max_file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::assemble::NOT_RECOGNIZED;
    use crate::reader::tests::{png_bytes, region, StubRecognizer};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    const BOUNDARY: &str = "plate-test-boundary";

    fn app_with(stub: StubRecognizer, max_file_size: usize) -> Router {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_file_size,
            preprocessing: PipelineOptions::default(),
            model_dir: std::env::temp_dir(),
        };
        let reader = PlateReader::new(Arc::new(stub), config.preprocessing);
        router(AppState {
            reader: Arc::new(reader),
            config: Arc::new(config),
        })
    }

    fn app(stub: StubRecognizer) -> Router {
        app_with(stub, 1024 * 1024)
    }

    fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"plate.png\"\r\n",
                field
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload(field: &str, data: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/recognize-plate/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(field, data)))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_recognize_two_row_plate() {
        let stub = StubRecognizer::returning(vec![
            region("234567", 0.6, 50.0),
            region("51F1", 0.8, 0.0),
            region("noise", 0.2, 90.0),
        ]);

        let response = app(stub).oneshot(upload("file", &png_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({
                "plate": "51F1234567",
                "confidence": 70.0,
                "all": [
                    { "text": "51F1", "confidence": 80.0 },
                    { "text": "234567", "confidence": 60.0 }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_recognize_nothing_found() {
        let response = app(StubRecognizer::returning(vec![]))
            .oneshot(upload("file", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["plate"], NOT_RECOGNIZED);
        assert_eq!(body["confidence"], 0.0);
        assert_eq!(body["all"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_image_is_bad_request() {
        let response = app(StubRecognizer::returning(vec![]))
            .oneshot(upload("file", b"this is not an image"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "INVALID_IMAGE");
        assert!(!body["detail"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let response = app(StubRecognizer::returning(vec![]))
            .oneshot(upload("image", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "MISSING_FILE");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let response = app_with(StubRecognizer::returning(vec![]), 16)
            .oneshot(upload("file", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(response).await["code"], "IMAGE_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_upload_past_body_limit_is_payload_too_large() {
        let oversized = vec![0u8; 16 + MULTIPART_OVERHEAD + 200 * 1024];

        let response = app_with(StubRecognizer::returning(vec![]), 16)
            .oneshot(upload("file", &oversized))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["code"], "IMAGE_TOO_LARGE");
        assert!(!body["detail"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recognizer_failure_is_internal_error() {
        let response = app(StubRecognizer::failing("detector out of memory"))
            .oneshot(upload("file", &png_bytes()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["detail"], "detector out of memory");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/recognize-plate/")
            .header(header::ORIGIN, "https://parking.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app(StubRecognizer::returning(vec![]))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(StubRecognizer::returning(vec![]))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_info_reports_engine_and_settings() {
        let request = Request::builder().uri("/info").body(Body::empty()).unwrap();

        let response = app(StubRecognizer::returning(vec![]))
            .oneshot(request)
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["engine"], "stub");
        assert_eq!(body["preprocessing"]["threshold"], 150);
        assert_eq!(body["preprocessing"]["scale_factor"], 2.0);
        assert_eq!(body["max_file_size_bytes"], 1024 * 1024);
    }
}
