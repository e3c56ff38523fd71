pub mod constants;

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::rate_limit::RateLimitConfig;
use constants::*;

/// Service configuration, built once at startup and passed to constructors
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Credential for the completion provider
    pub api_key: Option<String>,
    /// Model identifier sent with completion requests
    pub model: String,
    pub completion_url: String,
    pub search_url: String,
    pub db_path: PathBuf,
    /// Outer deadline applied to every HTTP request
    pub request_timeout: Duration,
    /// Inbound rate limiting; `None` disables it
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            completion_url: DEFAULT_COMPLETION_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            request_timeout: Duration::from_secs(60),
            rate_limit: Some(RateLimitConfig::default()),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Blank values count as unset; numbers that fail to parse fall back to
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Self::default();

        let request_timeout = get("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let rate_limit = match get("RATE_LIMIT_MODE")
            .map(|m| m.to_lowercase())
            .as_deref()
        {
            Some("disabled") => None,
            _ => {
                let fallback = RateLimitConfig::default();
                let per_second = get("RATE_LIMIT_PER_SECOND")
                    .and_then(|v| v.parse().ok())
                    .filter(|v: &u32| *v > 0)
                    .unwrap_or(fallback.per_second);
                let burst_size = get("RATE_LIMIT_BURST_SIZE")
                    .and_then(|v| v.parse().ok())
                    .filter(|v: &u32| *v > 0)
                    .unwrap_or(fallback.burst_size);
                Some(RateLimitConfig {
                    per_second,
                    burst_size,
                })
            }
        };

        Self {
            api_key: get("OPENROUTER_API_KEY"),
            model: get("OPENROUTER_MODEL").unwrap_or(defaults.model),
            completion_url: get("OPENROUTER_API_URL").unwrap_or(defaults.completion_url),
            search_url: get("SEARCH_API_URL").unwrap_or(defaults.search_url),
            db_path: get("WORDCRAFT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            request_timeout,
            rate_limit,
        }
    }
}

/// Load `config.txt` and `.env` into the process environment
///
/// Both files are optional. Variables already set in the environment win.
pub fn load_env_files() {
    // Runs before logging is initialised, so problems go straight to stderr
    for file in [CONFIG_FILE, DOTENV_FILE] {
        if let Err(e) = load_env_file(Path::new(file)) {
            eprintln!("Failed to parse {}: {}", file, e);
        }
    }
}

/// Load one optional key=value file; a missing file is not an error
fn load_env_file(path: &Path) -> Result<(), dotenvy::Error> {
    match dotenvy::from_filename(path) {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e),
    }
}
