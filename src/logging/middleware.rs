use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::utils::header_utils::extract_client_ip;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Request ID wrapper for tracking requests through the system
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Requests slower than this are reported in the application log
#[derive(Clone, Copy, Debug)]
pub struct SlowRequestThreshold(pub Duration);

/// Attach a request ID, reusing the client's `X-Request-ID` when present
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Log every HTTP request to the access log
pub async fn access_log_middleware(
    State(SlowRequestThreshold(threshold)): State<SlowRequestThreshold>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let client_ip = extract_client_ip(&req)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(req).await;

    let status = response.status();
    let duration = start.elapsed();

    let bytes_sent = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    // Request bodies carry user text, so only sizes and metadata are logged
    tracing::info!(
        target: "access_log",
        request_id = %request_id,
        client_ip = %client_ip,
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = duration.as_millis() as u64,
        bytes_sent = bytes_sent,
        user_agent = %user_agent,
        "HTTP request completed"
    );

    if duration > threshold {
        tracing::warn!(
            request_id = %request_id,
            path = %path,
            duration_ms = duration.as_millis() as u64,
            threshold_ms = threshold.as_millis() as u64,
            "Slow request detected"
        );
    }

    response
}
