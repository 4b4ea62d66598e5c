//! HTTP boundary for the image analysis service.
//!
//! `POST /imageanalysis/analyze` takes a multipart upload, runs it through the
//! [`ImageAnalyzer`] and maps the outcome onto status codes and JSON bodies.

use std::future::Future;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde::Serialize;
use tokio::net::TcpListener;

use crate::analysis::ImageAnalyzer;
use crate::error::{AnalyzeError, StartupError};
use crate::model::AnalysisOutcome;

pub const ANALYZE_PATH: &str = "/imageanalysis/analyze";
/// Controller-style spelling of [`ANALYZE_PATH`]; routes are matched case-sensitively
pub const ANALYZE_PATH_ALIAS: &str = "/ImageAnalysis/analyze";
pub const HEALTH_PATH: &str = "/health";

/// Multipart field the image is expected in; any field with a file name is accepted too
pub const IMAGE_FIELD: &str = "imageFile";

pub const NO_IMAGE_MESSAGE: &str = "No image file uploaded.";
pub const SUCCESS_MESSAGE: &str = "Image analysis completed successfully.";
pub const NOT_FOUND_MESSAGE: &str = "No matching recipes found for the detected ingredients.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred during image analysis.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct UnexpectedErrorResponse {
    pub error: String,
    pub details: String,
}

/// Builds the service router
pub fn router(analyzer: ImageAnalyzer, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(ANALYZE_PATH, post(analyze_image))
        .route(ANALYZE_PATH_ALIAS, post(analyze_image))
        .route(HEALTH_PATH, get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(analyzer)
}

/// Serves `router` on `listener` until Ctrl-C
pub async fn serve(listener: TcpListener, router: Router) -> Result<(), StartupError> {
    serve_with_shutdown(listener, router, shutdown_signal()).await
}

/// Serves `router` on `listener` until `shutdown` resolves
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Handler for `POST /imageanalysis/analyze`
pub async fn analyze_image(
    State(analyzer): State<ImageAnalyzer>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            warn!("Rejected upload: {}", rejection.body_text());
            return no_image_response();
        }
    };

    let image = match read_image(multipart).await {
        Ok(Some(image)) => image,
        Ok(None) => {
            warn!("Upload contained no image file");
            return no_image_response();
        }
        Err(e) => {
            warn!("Multipart read error: {}", e);
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return (StatusCode::PAYLOAD_TOO_LARGE, "Image file too large.").into_response();
            }
            return no_image_response();
        }
    };

    match analyzer.analyze(&image).await {
        Ok(outcome) if outcome.has_matches() => (
            StatusCode::OK,
            Json(AnalyzeResponse {
                outcome,
                message: SUCCESS_MESSAGE.to_string(),
            }),
        )
            .into_response(),
        Ok(outcome) => {
            info!(
                "No recipes match detected ingredients {:?}",
                outcome.detected_ingredients
            );
            (
                StatusCode::NOT_FOUND,
                Json(MessageResponse {
                    message: NOT_FOUND_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Returns the bytes of the first image field, if any
async fn read_image(mut multipart: Multipart) -> Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let is_image = field.name() == Some(IMAGE_FIELD) || field.file_name().is_some();
        if is_image {
            return Ok(Some(field.bytes().await?));
        }
    }
    Ok(None)
}

fn no_image_response() -> Response {
    (StatusCode::BAD_REQUEST, NO_IMAGE_MESSAGE).into_response()
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        match self {
            AnalyzeError::Validation => no_image_response(),
            AnalyzeError::Provider {
                status,
                code,
                message,
            } => {
                warn!("Vision provider failed ({} {}): {}", status, code, message);
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (
                    status,
                    Json(ProviderErrorResponse {
                        error: message,
                        code,
                    }),
                )
                    .into_response()
            }
            AnalyzeError::Unexpected(details) | AnalyzeError::Builder(details) => {
                error!("Image analysis failed: {}", details);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(UnexpectedErrorResponse {
                        error: UNEXPECTED_MESSAGE.to_string(),
                        details,
                    }),
                )
                    .into_response()
            }
        }
    }
}
