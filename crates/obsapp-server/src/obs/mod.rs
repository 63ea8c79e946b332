//! Request observation and Prometheus exposition.
//!
//! Storage, bucketing and the text encoder come from the `prometheus` crate;
//! this module only wires it into the request path and the `/metrics` handler.

pub mod metrics;
pub mod middleware;

pub use metrics::{HttpMetrics, EXPOSITION_CONTENT_TYPE};
pub use middleware::track_metrics;
