//! Request-observation middleware.
//!
//! Wraps every request (including `/metrics` and unmatched paths) and records
//! method, templated handler, status and latency into [`HttpMetrics`].
//! The handler label comes from `MatchedPath`, so variable path segments never
//! reach the label set.

use std::time::Instant;

use axum::{
    body::HttpBody as _,
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use prometheus::IntGauge;
use regex::Regex;

use crate::app_state::AppState;
use crate::config::MetricsSection;
use crate::obs::metrics::Observation;

/// Label used for requests that matched no route when grouping is on.
pub const UNTEMPLATED_HANDLER: &str = "none";

pub async fn track_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(metrics) = state.metrics() else {
        return next.run(req).await;
    };

    let matched = req.extensions().get::<MatchedPath>().map(|p| p.as_str().to_owned());
    let handler = handler_label(
        metrics.rules(),
        metrics.excluded(),
        matched.as_deref(),
        req.uri().path(),
    );
    let Some(handler) = handler else {
        return next.run(req).await;
    };

    let method = req.method().as_str().to_owned();
    let request_bytes = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let _inprogress = metrics.inprogress(&handler, &method).map(InProgress::enter);
    let start = Instant::now();
    let resp = next.run(req).await;
    let duration = start.elapsed();

    let status = status_label(resp.status(), metrics.rules().group_status_codes);
    let response_bytes = resp.body().size_hint().exact().unwrap_or(0);

    metrics.observe(&Observation {
        handler: &handler,
        method: &method,
        status: &status,
        duration,
        request_bytes,
        response_bytes,
    });
    tracing::trace!(%handler, %method, %status, ?duration, "request observed");

    resp
}

/// Decrements the in-progress gauge even if the request future is dropped.
struct InProgress(IntGauge);

impl InProgress {
    fn enter(gauge: IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InProgress {
    fn drop(&mut self) {
        self.0.dec();
    }
}

/// Resolve the `handler` label. `None` means the request is not recorded.
pub fn handler_label(
    rules: &MetricsSection,
    excluded: &[Regex],
    matched: Option<&str>,
    raw_path: &str,
) -> Option<String> {
    let handler = match matched {
        Some(template) => template.to_owned(),
        None if rules.ignore_untemplated => return None,
        None if rules.group_untemplated => UNTEMPLATED_HANDLER.to_owned(),
        None => raw_path.to_owned(),
    };

    if excluded.iter().any(|re| re.is_match(&handler)) {
        return None;
    }
    Some(handler)
}

/// `"2xx"`-style class when grouping, the numeric code otherwise.
pub fn status_label(status: StatusCode, group: bool) -> String {
    if group {
        format!("{}xx", status.as_u16() / 100)
    } else {
        status.as_u16().to_string()
    }
}
