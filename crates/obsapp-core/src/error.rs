//! Shared error type across obsapp crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Metrics registration or encoding failed.
    Metrics,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Metrics => "METRICS",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ObsError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ObsError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("metrics: {0}")]
    Metrics(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ObsError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ObsError::BadRequest(_) => ClientCode::BadRequest,
            ObsError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            ObsError::Metrics(_) => ClientCode::Metrics,
            ObsError::Internal(_) => ClientCode::Internal,
        }
    }
}
