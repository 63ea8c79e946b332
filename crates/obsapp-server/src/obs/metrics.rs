//! HTTP request metrics backed by the `prometheus` crate.
//!
//! Each server owns its own `Registry` (no global default registry), so
//! independent routers in one process never share counters. Families follow
//! the stock instrumentator layout: a request counter, a coarse latency
//! histogram per handler/method, an unlabeled high-resolution latency
//! histogram, request/response size histograms and an in-progress gauge.
//! On Linux the process collector is registered alongside.

use std::time::Duration;

use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec,
    IntGauge, IntGaugeVec, Opts, Registry, TextEncoder,
};
use regex::Regex;

use obsapp_core::error::{ObsError, Result};

use crate::config::MetricsSection;

/// Content type of the text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const LATENCY_LOWR_BUCKETS: [f64; 3] = [0.1, 0.5, 1.0];
const LATENCY_HIGHR_BUCKETS: [f64; 21] = [
    0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0,
    7.5, 10.0, 30.0, 60.0,
];

fn metrics_err(e: prometheus::Error) -> ObsError {
    ObsError::Metrics(e.to_string())
}

/// One finished request, ready to be recorded.
#[derive(Debug)]
pub struct Observation<'a> {
    pub handler: &'a str,
    pub method: &'a str,
    pub status: &'a str,
    pub duration: Duration,
    pub request_bytes: u64,
    pub response_bytes: u64,
}

pub struct HttpMetrics {
    registry: Registry,
    rules: MetricsSection,
    excluded: Vec<Regex>,
    pub requests_total: IntCounterVec,
    pub request_duration: HistogramVec,
    pub request_duration_highr: Histogram,
    pub request_size: HistogramVec,
    pub response_size: HistogramVec,
    pub requests_inprogress: IntGaugeVec,
}

impl HttpMetrics {
    /// Build the registry and register every family.
    pub fn new(cfg: &MetricsSection) -> Result<Self> {
        let excluded = cfg.excluded_patterns()?;
        let registry = Registry::new();
        let size_buckets = exponential_buckets(64.0, 4.0, 8).map_err(metrics_err)?;

        let requests_total = IntCounterVec::new(
            opts(
                cfg,
                "http_requests_total",
                "Total number of requests by method, status and handler.",
            ),
            &["handler", "method", "status"],
        )
        .map_err(metrics_err)?;

        let request_duration = HistogramVec::new(
            HistogramOpts::from(opts(
                cfg,
                "http_request_duration_seconds",
                "Latency with only few buckets by handler and method.",
            ))
            .buckets(LATENCY_LOWR_BUCKETS.to_vec()),
            &["handler", "method"],
        )
        .map_err(metrics_err)?;

        let request_duration_highr = Histogram::with_opts(
            HistogramOpts::from(opts(
                cfg,
                "http_request_duration_highr_seconds",
                "Latency with many buckets but no labels.",
            ))
            .buckets(LATENCY_HIGHR_BUCKETS.to_vec()),
        )
        .map_err(metrics_err)?;

        let request_size = HistogramVec::new(
            HistogramOpts::from(opts(
                cfg,
                "http_request_size_bytes",
                "Content length of incoming requests by handler.",
            ))
            .buckets(size_buckets.clone()),
            &["handler"],
        )
        .map_err(metrics_err)?;

        let response_size = HistogramVec::new(
            HistogramOpts::from(opts(
                cfg,
                "http_response_size_bytes",
                "Content length of outgoing responses by handler.",
            ))
            .buckets(size_buckets),
            &["handler"],
        )
        .map_err(metrics_err)?;

        let requests_inprogress = IntGaugeVec::new(
            opts(cfg, "http_requests_inprogress", "Number of HTTP requests in progress."),
            &["handler", "method"],
        )
        .map_err(metrics_err)?;

        registry.register(Box::new(requests_total.clone())).map_err(metrics_err)?;
        registry.register(Box::new(request_duration.clone())).map_err(metrics_err)?;
        registry.register(Box::new(request_duration_highr.clone())).map_err(metrics_err)?;
        registry.register(Box::new(request_size.clone())).map_err(metrics_err)?;
        registry.register(Box::new(response_size.clone())).map_err(metrics_err)?;
        if cfg.inprogress {
            registry.register(Box::new(requests_inprogress.clone())).map_err(metrics_err)?;
        }

        #[cfg(target_os = "linux")]
        registry
            .register(Box::new(prometheus::process_collector::ProcessCollector::for_self()))
            .map_err(metrics_err)?;

        Ok(Self {
            registry,
            rules: cfg.clone(),
            excluded,
            requests_total,
            request_duration,
            request_duration_highr,
            request_size,
            response_size,
            requests_inprogress,
        })
    }

    pub fn rules(&self) -> &MetricsSection {
        &self.rules
    }

    /// Compiled `excluded_handlers` patterns.
    pub fn excluded(&self) -> &[Regex] {
        &self.excluded
    }

    /// Gauge for requests currently being served, if in-progress tracking is on.
    pub fn inprogress(&self, handler: &str, method: &str) -> Option<IntGauge> {
        if !self.rules.inprogress {
            return None;
        }
        Some(self.requests_inprogress.with_label_values(&[handler, method]))
    }

    /// Record a finished request.
    pub fn observe(&self, o: &Observation<'_>) {
        let secs = o.duration.as_secs_f64();
        self.requests_total
            .with_label_values(&[o.handler, o.method, o.status])
            .inc();
        self.request_duration
            .with_label_values(&[o.handler, o.method])
            .observe(secs);
        self.request_duration_highr.observe(secs);
        self.request_size
            .with_label_values(&[o.handler])
            .observe(o.request_bytes as f64);
        self.response_size
            .with_label_values(&[o.handler])
            .observe(o.response_bytes as f64);
    }

    /// Current value of the request counter for one label set.
    pub fn request_count(&self, handler: &str, method: &str, status: &str) -> u64 {
        self.requests_total
            .get_metric_with_label_values(&[handler, method, status])
            .map(|c| c.get())
            .unwrap_or(0)
    }

    /// Render the whole registry in Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .map_err(metrics_err)?;
        String::from_utf8(buf).map_err(|e| ObsError::Metrics(format!("non-utf8 exposition: {e}")))
    }
}

fn opts(cfg: &MetricsSection, name: &str, help: &str) -> Opts {
    let mut o = Opts::new(name, help);
    if let Some(ns) = &cfg.namespace {
        o = o.namespace(ns.clone());
    }
    if let Some(ss) = &cfg.subsystem {
        o = o.subsystem(ss.clone());
    }
    o
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation<'a>(handler: &'a str, status: &'a str) -> Observation<'a> {
        Observation {
            handler,
            method: "GET",
            status,
            duration: Duration::from_millis(3),
            request_bytes: 0,
            response_bytes: 15,
        }
    }

    #[test]
    fn observe_counts_per_label_set() {
        let m = HttpMetrics::new(&MetricsSection::default()).unwrap();
        m.observe(&observation("/", "2xx"));
        m.observe(&observation("/", "2xx"));
        m.observe(&observation("/health", "2xx"));

        assert_eq!(m.request_count("/", "GET", "2xx"), 2);
        assert_eq!(m.request_count("/health", "GET", "2xx"), 1);
        assert_eq!(m.request_count("/health", "GET", "5xx"), 0);
        assert_eq!(m.request_duration_highr.get_sample_count(), 3);
    }

    #[test]
    fn render_contains_families() {
        let m = HttpMetrics::new(&MetricsSection::default()).unwrap();
        m.observe(&observation("/health", "2xx"));
        let text = m.render().unwrap();

        assert!(text.contains("# TYPE http_requests_total counter"));
        let counter = r#"http_requests_total{handler="/health",method="GET",status="2xx"} 1"#;
        assert!(text.contains(counter));
        assert!(text.contains("# TYPE http_request_duration_seconds histogram"));
        let bucket =
            r#"http_request_duration_seconds_bucket{handler="/health",method="GET",le="0.1"} 1"#;
        assert!(text.contains(bucket));
    }

    #[test]
    fn namespace_prefixes_names() {
        let cfg = MetricsSection {
            namespace: Some("obsapp".into()),
            subsystem: Some("api".into()),
            ..Default::default()
        };
        let m = HttpMetrics::new(&cfg).unwrap();
        m.observe(&observation("/", "2xx"));
        let text = m.render().unwrap();
        assert!(text.contains("obsapp_api_http_requests_total{"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn process_collector_is_registered() {
        let m = HttpMetrics::new(&MetricsSection::default()).unwrap();
        let text = m.render().unwrap();
        assert!(text.contains("process_resident_memory_bytes"));
        assert!(text.contains("process_cpu_seconds_total"));
    }

    #[test]
    fn inprogress_can_be_disabled() {
        let cfg = MetricsSection { inprogress: false, ..Default::default() };
        let m = HttpMetrics::new(&cfg).unwrap();
        assert!(m.inprogress("/", "GET").is_none());
        assert!(!m.render().unwrap().contains("http_requests_inprogress"));
    }
}
