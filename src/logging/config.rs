use std::env;
use std::time::Duration;

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Custom log directory path (overrides auto-detection)
    pub custom_log_dir: Option<String>,

    /// Console filter directives, used when RUST_LOG is unset
    pub console_log_level: String,

    /// Filter directives for the JSON application log (default: "wordcraft=debug")
    pub file_log_level: String,

    /// Write access.log and application.log files (default: true)
    pub file_logging_enabled: bool,

    /// Archive retention in days (default: 30)
    pub retention_days: u32,

    /// Maximum total archive size in MB (default: 1000)
    pub max_total_size_mb: u64,

    /// Gzip rotated logs when archiving them (default: true)
    pub compression_enabled: bool,

    /// Enable background cleanup task (default: true)
    pub enable_cleanup: bool,

    /// Requests slower than this are reported in the application log
    pub slow_request_threshold: Duration,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            custom_log_dir: None,
            console_log_level: "wordcraft=info,sqlx=warn,hyper=warn".to_string(),
            file_log_level: "wordcraft=debug".to_string(),
            file_logging_enabled: true,
            retention_days: 30,
            max_total_size_mb: 1000,
            compression_enabled: true,
            enable_cleanup: true,
            slow_request_threshold: Duration::from_millis(5000),
        }
    }
}

impl LogConfig {
    /// Load logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let flag = |key: &str, current: bool| {
            lookup(key)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(current)
        };

        if let Some(dir) = lookup("WORDCRAFT_LOG_DIR").filter(|d| !d.trim().is_empty()) {
            config.custom_log_dir = Some(dir);
        }

        if let Some(level) = lookup("WORDCRAFT_FILE_LOG_LEVEL") {
            config.file_log_level = level;
        }

        config.file_logging_enabled = flag("WORDCRAFT_FILE_LOG", config.file_logging_enabled);
        config.compression_enabled = flag("LOG_COMPRESSION", config.compression_enabled);
        config.enable_cleanup = flag("LOG_ENABLE_CLEANUP", config.enable_cleanup);

        if let Some(days) = lookup("LOG_RETENTION_DAYS").and_then(|v| v.trim().parse().ok()) {
            config.retention_days = days;
        }

        if let Some(size) = lookup("LOG_MAX_TOTAL_SIZE_MB").and_then(|v| v.trim().parse().ok()) {
            config.max_total_size_mb = size;
        }

        if let Some(ms) = lookup("LOG_SLOW_REQUEST_THRESHOLD_MS").and_then(|v| v.trim().parse().ok())
        {
            config.slow_request_threshold = Duration::from_millis(ms);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.file_log_level, "wordcraft=debug");
        assert!(config.file_logging_enabled);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.max_total_size_mb, 1000);
        assert!(config.compression_enabled);
        assert!(config.enable_cleanup);
        assert_eq!(config.slow_request_threshold, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_custom_values() {
        let config = LogConfig::from_lookup(lookup(&[
            ("WORDCRAFT_LOG_DIR", "/tmp/wc"),
            ("LOG_RETENTION_DAYS", "60"),
            ("LOG_COMPRESSION", "false"),
            ("WORDCRAFT_FILE_LOG", "FALSE"),
            ("LOG_SLOW_REQUEST_THRESHOLD_MS", "3000"),
        ]));

        assert_eq!(config.custom_log_dir.as_deref(), Some("/tmp/wc"));
        assert_eq!(config.retention_days, 60);
        assert!(!config.compression_enabled);
        assert!(!config.file_logging_enabled);
        assert_eq!(config.slow_request_threshold, Duration::from_millis(3000));
    }

    #[test]
    fn test_invalid_numbers_use_defaults() {
        let config = LogConfig::from_lookup(lookup(&[
            ("LOG_RETENTION_DAYS", "not-a-number"),
            ("LOG_MAX_TOTAL_SIZE_MB", "-5"),
            ("LOG_SLOW_REQUEST_THRESHOLD_MS", "soon"),
        ]));

        assert_eq!(config.retention_days, 30);
        assert_eq!(config.max_total_size_mb, 1000);
        assert_eq!(config.slow_request_threshold, Duration::from_secs(5));
    }

    #[test]
    fn test_blank_log_dir_ignored() {
        let config = LogConfig::from_lookup(lookup(&[("WORDCRAFT_LOG_DIR", "  ")]));
        assert!(config.custom_log_dir.is_none());
    }
}
