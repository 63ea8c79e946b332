//! Shared application state.
//!
//! Built once in `main` and injected into the router. Owns the config and,
//! when instrumentation is active, the metrics registry.

use std::sync::Arc;

use obsapp_core::error::Result;

use crate::config::ServerConfig;
use crate::obs::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    metrics: Option<Arc<HttpMetrics>>,
}

impl AppState {
    /// Build application state, consulting the metrics env var if configured.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let env_value = std::env::var(&cfg.metrics.env_var_name).ok();
        Self::with_env(cfg, env_value.as_deref())
    }

    /// Same as [`AppState::new`] with an explicit env var value.
    pub fn with_env(cfg: ServerConfig, env_value: Option<&str>) -> Result<Self> {
        let metrics = if cfg.metrics.is_active(env_value) {
            Some(Arc::new(HttpMetrics::new(&cfg.metrics)?))
        } else {
            tracing::info!("metrics instrumentation disabled");
            None
        };

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, metrics }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Option<Arc<HttpMetrics>> {
        self.inner.metrics.clone()
    }
}
