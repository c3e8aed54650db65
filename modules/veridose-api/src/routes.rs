use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use veridose_common::{CheckRequest, VeridoseError};
use veridose_pipeline::Orchestrator;

pub struct AppState {
    pub orchestrator: Orchestrator,
}

pub async fn product_checker(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Response {
    match state.orchestrator.check(&req).await {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!(error = %e, "Product check failed");
            }
            (status, e.to_string()).into_response()
        }
    }
}

/// CORS preflight. Non-POST/OPTIONS methods get axum's automatic 405.
pub async fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("POST, OPTIONS"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type, Authorization"),
            ),
        ],
    )
        .into_response()
}

pub async fn health() -> &'static str {
    "ok"
}

fn status_for(e: &VeridoseError) -> StatusCode {
    match e {
        VeridoseError::InvalidPayload => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_payload_maps_to_400_with_fixed_body() {
        let e = VeridoseError::InvalidPayload;
        assert_eq!(status_for(&e), StatusCode::BAD_REQUEST);
        assert_eq!(e.to_string(), "Provide exactly one of text, url, image_base64");
    }

    #[test]
    fn pipeline_failures_map_to_500() {
        assert_eq!(
            status_for(&VeridoseError::UnresolvedInput("no match".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&VeridoseError::Provider("timeout".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&VeridoseError::Database("connection reset".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn preflight_is_204_with_cors_headers() {
        let resp = preflight().await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap(),
            "POST, OPTIONS"
        );
    }
}
