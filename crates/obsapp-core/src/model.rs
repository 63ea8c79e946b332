//! JSON response bodies.
//!
//! Both bodies are constant; they are built per request and serialized
//! straight away.

use serde::{Deserialize, Serialize};

pub const ROOT_MESSAGE: &str = "FastAPI Observability App";
pub const HEALTH_OK: &str = "ok";

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self { message: ROOT_MESSAGE.to_string() }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { status: HEALTH_OK.to_string() }
    }
}
