//! obsapp server library entry.
//!
//! Wires config, shared state, handlers and request instrumentation into an
//! axum router. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
