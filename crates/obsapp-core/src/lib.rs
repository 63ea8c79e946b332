//! obsapp core: transport-agnostic response models and error types.
//!
//! This crate defines the JSON contracts served by the HTTP layer and the
//! error surface shared with it. It carries no runtime or HTTP dependencies
//! so the models can be reused by clients and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;

/// Shared result type.
pub use error::{ObsError, Result};
pub use model::{HealthResponse, RootResponse};
