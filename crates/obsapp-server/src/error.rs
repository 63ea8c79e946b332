// HTTP polish for core errors.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use obsapp_core::error::ObsError;
use serde_json::json;

/// Wrapper so core errors can be returned straight from handlers.
#[derive(Debug)]
pub struct HttpError(pub ObsError);

impl From<ObsError> for HttpError {
    fn from(e: ObsError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ObsError::BadRequest(_) | ObsError::UnsupportedVersion => StatusCode::BAD_REQUEST,
            ObsError::Metrics(_) | ObsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self.0, "request failed");
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
