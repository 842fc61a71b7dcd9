use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8000;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log() -> String {
    "info".to_string()
}

// ─── ObservabilityConfig ─────────────────────────────────────────────────────

/// Observability configuration (`[observability]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds). Default: 100.
    /// Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── AppConfig ───────────────────────────────────────────────────────────────

/// Runtime configuration: `config.toml` in the data directory, overridden by
/// CLI flags / environment variables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP port. Default: 8000.
    pub port: u16,
    /// Bind address. Default: 127.0.0.1; use 0.0.0.0 for LAN access.
    pub bind_address: String,
    /// Directory holding the SQLite database and config.toml.
    pub data_dir: PathBuf,
    /// Log filter (trace, debug, info, warn, error, or any EnvFilter directive).
    pub log: String,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: default_bind_address(),
            data_dir: default_data_dir(),
            log: default_log(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the effective configuration: file values first, then any
    /// CLI/env overrides on top.
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let mut config = Self::load_file(&data_dir).unwrap_or_default();
        config.data_dir = data_dir;
        if let Some(port) = port {
            config.port = port;
        }
        if let Some(log) = log {
            config.log = log;
        }
        if let Some(bind_address) = bind_address {
            config.bind_address = bind_address;
        }
        config
    }

    /// Read `config.toml` from the data directory, if present. A malformed
    /// file is ignored with a warning rather than refusing to start.
    fn load_file(data_dir: &Path) -> Option<Self> {
        let path = data_dir.join("config.toml");
        let raw = std::fs::read_to_string(&path).ok()?;
        match toml::from_str(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(path = %path.display(), err = %err, "ignoring malformed config.toml");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_nothing_is_given() {
        let config = AppConfig::new(None, None, None, None);
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.log, "info");
        assert_eq!(config.observability.slow_query_threshold_ms, 100);
    }

    #[test]
    fn file_values_are_loaded_from_data_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "port = 9001\nlog = \"debug\"\n\n[observability]\nslow_query_threshold_ms = 0\n",
        )
        .unwrap();

        let config = AppConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.port, 9001);
        assert_eq!(config.log, "debug");
        assert_eq!(config.observability.slow_query_threshold_ms, 0);
    }

    #[test]
    fn cli_overrides_beat_the_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = 9001\n").unwrap();

        let config = AppConfig::new(
            Some(9002),
            Some(dir.path().to_path_buf()),
            Some("warn".into()),
            Some("0.0.0.0".into()),
        );
        assert_eq!(config.port, 9002);
        assert_eq!(config.log, "warn");
        assert_eq!(config.bind_address, "0.0.0.0");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = \"not a number").unwrap();

        let config = AppConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(config.port, 8000);
    }
}
