//! Response body wire-format tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use obsapp_core::{HealthResponse, RootResponse};

#[test]
fn root_body_is_exact() {
    let s = serde_json::to_string(&RootResponse::default()).unwrap();
    assert_eq!(s, r#"{"message":"FastAPI Observability App"}"#);
}

#[test]
fn health_body_is_exact() {
    let s = serde_json::to_string(&HealthResponse::ok()).unwrap();
    assert_eq!(s, r#"{"status":"ok"}"#);
}

#[test]
fn health_body_parses_with_whitespace() {
    let parsed: HealthResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();
    assert_eq!(parsed, HealthResponse::ok());
}
