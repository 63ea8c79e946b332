//! Server config loader (strict parsing).
//!
//! Sources, in order: YAML file (`OBSAPP_CONFIG`, default `obsapp.yaml`;
//! a missing file means defaults), then `OBSAPP_LISTEN` for the bind address.

pub mod schema;

use std::{env, fs, io, path::Path};

use obsapp_core::error::{ObsError, Result};

pub use schema::{MetricsSection, ServerConfig, ServerSection};

pub const CONFIG_PATH_ENV: &str = "OBSAPP_CONFIG";
pub const LISTEN_ENV: &str = "OBSAPP_LISTEN";
const DEFAULT_CONFIG_PATH: &str = "obsapp.yaml";

/// Load config the way the binary does: file (if present) plus env overrides.
pub fn load() -> Result<ServerConfig> {
    let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_with(Path::new(&path), env::var(LISTEN_ENV).ok())
}

/// Config file at `path` (defaults when it does not exist) plus an optional
/// bind address override. The result is validated after the override.
pub fn load_with(path: &Path, listen: Option<String>) -> Result<ServerConfig> {
    let mut cfg = match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            ServerConfig::default()
        }
        Err(e) => {
            return Err(ObsError::Internal(format!(
                "read config {} failed: {e}",
                path.display()
            )))
        }
    };

    if let Some(listen) = listen {
        cfg.server.listen = listen;
        cfg.validate()?;
    }
    Ok(cfg)
}

/// Parse and validate a YAML document. An empty (or comment-only) document
/// yields defaults.
pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let empty = s.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'));
    let cfg = if empty {
        ServerConfig::default()
    } else {
        serde_yaml::from_str::<Option<ServerConfig>>(s)
            .map_err(|e| ObsError::BadRequest(format!("invalid yaml: {e}")))?
            .unwrap_or_default()
    };
    cfg.validate()?;
    Ok(cfg)
}
