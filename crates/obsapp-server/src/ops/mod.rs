//! HTTP endpoints.
//!
//! - `/`        : service banner
//! - `/health`  : liveness
//! - `/metrics` : Prometheus text format (path configurable)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use obsapp_core::{error::ObsError, HealthResponse, RootResponse};

use crate::app_state::AppState;
use crate::error::HttpError;
use crate::obs::EXPOSITION_CONTENT_TYPE;

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse::default())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

pub async fn metrics(State(state): State<AppState>) -> Result<Response, HttpError> {
    let metrics = state
        .metrics()
        .ok_or_else(|| ObsError::Internal("metrics not installed".into()))?;
    let body = metrics.render()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        body,
    )
        .into_response())
}
