use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Extract the client IP address for a request
///
/// Looks at, in order: the first entry of `X-Forwarded-For`, `X-Real-IP`,
/// and the socket peer address recorded by axum's `ConnectInfo`.
///
/// # Examples
///
/// ```
/// use axum::{body::Body, extract::Request};
/// use wordcraft::utils::header_utils::extract_client_ip;
///
/// let request = Request::builder()
///     .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
///     .body(Body::empty())
///     .unwrap();
/// assert_eq!(extract_client_ip(&request), Some("203.0.113.7".parse().unwrap()));
/// ```
pub fn extract_client_ip(request: &Request) -> Option<IpAddr> {
    forwarded_ip(request.headers()).or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(value) = headers.get("x-forwarded-for") {
        if let Ok(value) = value.to_str() {
            if let Some(ip) = value
                .split(',')
                .next()
                .and_then(|first| first.trim().parse().ok())
            {
                return Some(ip);
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
