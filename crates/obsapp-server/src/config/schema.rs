use std::net::SocketAddr;

use obsapp_core::error::{ObsError, Result};
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ObsError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ObsError::BadRequest(format!(
                "server.listen must be a valid SocketAddr ({}): {e}",
                self.listen
            ))
        })
    }
}

/// Instrumentation knobs. Defaults match a stock request instrumentator.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// When set, `env_var_name` must be `"true"` or `"1"` for metrics to be installed.
    #[serde(default)]
    pub respect_env_var: bool,

    #[serde(default = "default_env_var_name")]
    pub env_var_name: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_true")]
    pub group_status_codes: bool,

    #[serde(default)]
    pub ignore_untemplated: bool,

    #[serde(default = "default_true")]
    pub group_untemplated: bool,

    /// Regex patterns; a handler label matching any of them (unanchored
    /// search) is not recorded.
    #[serde(default)]
    pub excluded_handlers: Vec<String>,

    #[serde(default = "default_true")]
    pub inprogress: bool,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub subsystem: Option<String>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            respect_env_var: false,
            env_var_name: default_env_var_name(),
            endpoint: default_endpoint(),
            group_status_codes: true,
            ignore_untemplated: false,
            group_untemplated: true,
            excluded_handlers: Vec::new(),
            inprogress: true,
            namespace: None,
            subsystem: None,
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with('/') {
            return Err(ObsError::BadRequest("metrics.endpoint must start with '/'".into()));
        }
        if self.endpoint.contains("//") || self.endpoint.contains([':', '*']) {
            return Err(ObsError::BadRequest(format!(
                "metrics.endpoint must be a static path without ':', '*' or '//' ({})",
                self.endpoint
            )));
        }
        if matches!(self.endpoint.as_str(), "/" | "/health") {
            return Err(ObsError::BadRequest(format!(
                "metrics.endpoint must not shadow {}",
                self.endpoint
            )));
        }
        if self.respect_env_var && self.env_var_name.trim().is_empty() {
            return Err(ObsError::BadRequest(
                "metrics.env_var_name must not be empty when respect_env_var is set".into(),
            ));
        }
        for prefix in [&self.namespace, &self.subsystem].into_iter().flatten() {
            if !is_metric_name_part(prefix) {
                return Err(ObsError::BadRequest(format!(
                    "metrics prefix {prefix:?} is not a valid metric name part"
                )));
            }
        }
        self.excluded_patterns()?;
        Ok(())
    }

    /// Compile `excluded_handlers`.
    pub fn excluded_patterns(&self) -> Result<Vec<Regex>> {
        self.excluded_handlers
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    ObsError::BadRequest(format!("metrics.excluded_handlers entry {p:?}: {e}"))
                })
            })
            .collect()
    }

    /// Whether instrumentation should be installed, given the env lookup.
    pub fn is_active(&self, env_value: Option<&str>) -> bool {
        if !self.enabled {
            return false;
        }
        if !self.respect_env_var {
            return true;
        }
        env_value.is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
    }
}

fn is_metric_name_part(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn default_version() -> u32 {
    1
}
fn default_listen() -> String {
    "0.0.0.0:8000".into()
}
fn default_true() -> bool {
    true
}
fn default_env_var_name() -> String {
    "ENABLE_METRICS".into()
}
fn default_endpoint() -> String {
    "/metrics".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_gate() {
        let m = MetricsSection { respect_env_var: true, ..Default::default() };
        assert!(!m.is_active(None));
        assert!(!m.is_active(Some("false")));
        assert!(m.is_active(Some("TRUE")));
        assert!(m.is_active(Some("1")));
        assert!(!m.is_active(Some("yes")));

        let off = MetricsSection { enabled: false, ..Default::default() };
        assert!(!off.is_active(Some("true")));
        assert!(MetricsSection::default().is_active(None));
    }

    #[test]
    fn excluded_handlers_must_be_regexes() {
        let m = MetricsSection { excluded_handlers: vec!["(".into()], ..Default::default() };
        assert!(m.validate().is_err());
        let m = MetricsSection { excluded_handlers: vec!["^/heal".into()], ..Default::default() };
        assert_eq!(m.excluded_patterns().unwrap().len(), 1);
    }

    #[test]
    fn prefix_must_be_metric_name() {
        let m = MetricsSection { namespace: Some("9bad".into()), ..Default::default() };
        assert!(m.validate().is_err());
        let m = MetricsSection { namespace: Some("obsapp".into()), ..Default::default() };
        assert!(m.validate().is_ok());
    }
}
