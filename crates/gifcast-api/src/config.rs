//! API configuration.

use std::path::PathBuf;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3003;

/// Default upload size limit in MiB.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Directory for incoming uploads (ephemeral)
    pub upload_dir: PathBuf,
    /// Directory served publicly (client page + generated GIFs)
    pub public_dir: PathBuf,
    /// Max uploaded file size in bytes
    pub max_upload_bytes: usize,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Capacity of the progress broadcast channel
    pub progress_buffer: usize,
    /// Expose Prometheus metrics at /metrics
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("uploads"),
            public_dir: PathBuf::from("public"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024, // 50MiB
            cors_origins: vec!["*".to_string()],
            progress_buffer: 64,
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("API_HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.port),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            max_upload_bytes: lookup("MAX_UPLOAD_MB")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|mb| *mb > 0)
                .and_then(|mb| mb.checked_mul(1024 * 1024))
                .unwrap_or(defaults.max_upload_bytes),
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            progress_buffer: lookup("PROGRESS_BUFFER")
                .and_then(|s| s.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.progress_buffer),
            metrics_enabled: lookup("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Bind address as `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 3003);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.bind_address(), "0.0.0.0:3003");
    }

    #[test]
    fn test_port_override() {
        let config = ApiConfig::from_lookup(lookup(&[("PORT", "8080")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("MAX_UPLOAD_MB", "0"),
            ("PROGRESS_BUFFER", "-4"),
        ]));
        assert_eq!(config.port, 3003);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.progress_buffer, 64);
    }

    #[test]
    fn test_oversized_upload_limit_falls_back() {
        let huge = (usize::MAX / 1024).to_string();
        let config = ApiConfig::from_lookup(lookup(&[("MAX_UPLOAD_MB", huge.as_str())]));
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_cors_and_metrics() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
            ("METRICS_ENABLED", "false"),
        ]));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!config.metrics_enabled);
    }
}
