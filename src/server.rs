use crate::config::RelayConfig;
use crate::credentials::resolve_api_key;
use crate::error::RelayError;
use crate::logging::SharedLogger;
use crate::proxy::{self, RelayOutcome};
use crate::translate::generic_types::GenericRequest;
use crate::translate::response::ResponseShape;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Everything a request handler needs. Built once at startup, never mutated.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    /// Used when a request carries no key of its own.
    pub default_api_key: Option<String>,
    pub client: reqwest::Client,
    pub logger: SharedLogger,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let max_body_bytes = state.config.max_body_bytes;

    // `*path` needs at least one segment, so the bare prefix gets its own route.
    Router::new()
        .route("/v1/", post(handle_relay))
        .route("/v1/*path", post(handle_relay))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_relay(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path();
    let shape = ResponseShape::from_path(path);

    let req: GenericRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            state
                .logger
                .error("server", format!("Failed to parse request: {}", e));
            let err = RelayError::invalid_request(format!("Invalid JSON: {}", e));
            return error_response(shape, &err);
        }
    };

    state.logger.debug(
        "server",
        format!(
            "Request: POST {} model={} messages={}",
            path,
            req.model,
            req.messages.len()
        ),
    );

    let Some(api_key) = resolve_api_key(&headers, state.default_api_key.as_deref()) else {
        state.logger.warn("server", "Rejected request without API key");
        return error_response(shape, &RelayError::MissingCredential);
    };

    match proxy::relay(&req, &api_key, shape, &state.config, &state.client, &state.logger).await {
        Ok(RelayOutcome::Success(resp)) => Json(resp).into_response(),
        Ok(RelayOutcome::Upstream {
            status,
            content_type,
            body,
        }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let mut builder = Response::builder().status(status);
            if let Some(ct) = content_type {
                builder = builder.header(header::CONTENT_TYPE, ct);
            }
            builder
                .body(Body::from(body))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        Err(e) => {
            if matches!(e, RelayError::Gateway { .. }) {
                state.logger.error("server", format!("Upstream unreachable: {}", e));
            }
            error_response(shape, &e)
        }
    }
}

/// Render an error in the caller's expected error shape.
fn error_response(shape: ResponseShape, err: &RelayError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(shape.error_body(err.error_type(), err.to_string()))).into_response()
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
