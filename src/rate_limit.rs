use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::utils::header_utils::extract_client_ip;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: String,
    error: String,
}

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests per second allowed
    pub per_second: u32,
    /// Burst size (max requests in a single burst)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 5,
            burst_size: 10,
        }
    }
}

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter that tracks limits per client IP address
///
/// Requests whose client address cannot be determined share one bucket.
#[derive(Clone)]
pub struct PerIpRateLimiter {
    /// Rate limiters indexed by client address
    limiters: Arc<DashMap<String, Arc<DirectLimiter>>>,
    quota: Quota,
    clock: DefaultClock,
}

impl PerIpRateLimiter {
    /// Create a new per-IP rate limiter with the given configuration
    ///
    /// Zero values are raised to one.
    pub fn new(config: RateLimitConfig) -> Self {
        // burst_size requests immediately, then refill at per_second
        let per_second = NonZeroU32::new(config.per_second).unwrap_or(NonZeroU32::MIN);
        let burst_size = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst_size);

        Self {
            limiters: Arc::new(DashMap::new()),
            quota,
            clock: DefaultClock::default(),
        }
    }

    fn get_or_create_limiter(&self, client: &str) -> Arc<DirectLimiter> {
        self.limiters
            .entry(client.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
            .clone()
    }

    /// Check if a request from the given client should be allowed
    ///
    /// On rejection returns how long the client has to wait.
    pub fn check_rate_limit(&self, client: &str) -> Result<(), std::time::Duration> {
        let limiter = self.get_or_create_limiter(client);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => Err(not_until.wait_time_from(self.clock.now())),
        }
    }

    /// Get the number of tracked clients
    #[cfg(test)]
    pub fn tracked_clients_count(&self) -> usize {
        self.limiters.len()
    }
}

/// Middleware to enforce per-IP rate limiting
pub async fn rate_limit_middleware(
    State(limiter): State<PerIpRateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client = extract_client_ip(&request)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match limiter.check_rate_limit(&client) {
        Ok(_) => next.run(request).await,
        Err(wait_duration) => {
            // Round up so clients never retry too early
            let retry_after = wait_duration.as_secs() + 1;

            tracing::warn!(
                client_ip = %client,
                retry_after_secs = retry_after,
                "Rate limit exceeded"
            );

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    status: "error".to_string(),
                    error: format!(
                        "Rate limit exceeded. Please retry after {} seconds.",
                        retry_after
                    ),
                }),
            )
                .into_response();

            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from(retry_after));

            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = PerIpRateLimiter::new(RateLimitConfig {
            per_second: 5,
            burst_size: 10,
        });

        assert_eq!(limiter.tracked_clients_count(), 0);
    }

    #[test]
    fn test_rate_limiter_allows_requests_within_limit() {
        let limiter = PerIpRateLimiter::new(RateLimitConfig {
            per_second: 10,
            burst_size: 5,
        });

        for i in 0..5 {
            let result = limiter.check_rate_limit("127.0.0.1");
            assert!(result.is_ok(), "Request {} should be allowed", i);
        }
    }

    #[test]
    fn test_rate_limiter_rejects_requests_over_limit() {
        let limiter = PerIpRateLimiter::new(RateLimitConfig {
            per_second: 1,
            burst_size: 3,
        });

        for _ in 0..3 {
            assert!(limiter.check_rate_limit("127.0.0.1").is_ok());
        }

        let result = limiter.check_rate_limit("127.0.0.1");
        assert!(result.is_err(), "Request over burst should be rejected");

        if let Err(wait_duration) = result {
            assert!(wait_duration > Duration::from_millis(0));
        }
    }

    #[test]
    fn test_rate_limiter_separate_clients_independent() {
        let limiter = PerIpRateLimiter::new(RateLimitConfig {
            per_second: 1,
            burst_size: 2,
        });

        assert!(limiter.check_rate_limit("10.0.0.1").is_ok());
        assert!(limiter.check_rate_limit("10.0.0.1").is_ok());
        assert!(limiter.check_rate_limit("10.0.0.1").is_err());

        // Second client still has its full quota
        assert!(limiter.check_rate_limit("10.0.0.2").is_ok());
        assert!(limiter.check_rate_limit("10.0.0.2").is_ok());
        assert!(limiter.check_rate_limit("10.0.0.2").is_err());

        assert_eq!(limiter.tracked_clients_count(), 2);
    }

    #[test]
    fn test_zero_config_does_not_panic() {
        let limiter = PerIpRateLimiter::new(RateLimitConfig {
            per_second: 0,
            burst_size: 0,
        });
        assert!(limiter.check_rate_limit("127.0.0.1").is_ok());
    }

    #[test]
    fn test_rate_limiter_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.per_second, 5);
        assert_eq!(config.burst_size, 10);
    }

    #[test]
    fn test_same_client_reuses_limiter() {
        let limiter = PerIpRateLimiter::new(RateLimitConfig::default());

        let _ = limiter.check_rate_limit("same");
        let _ = limiter.check_rate_limit("same");
        let _ = limiter.check_rate_limit("same");

        assert_eq!(limiter.tracked_clients_count(), 1);
    }
}
