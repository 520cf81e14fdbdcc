//! Per-client rate limiting middleware

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::infrastructure::RateLimiter;
use crate::interfaces::http::common::ApiError;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// First `X-Forwarded-For` hop, else the peer address, else `unknown`.
fn client_identifier(request: &Request<Body>) -> String {
    let forwarded = request
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_identifier(&request);
    if !limiter.check(&client) {
        metrics::counter!("rate_limit_rejections_total").increment(1);
        warn!(client = %client, "Rate limit exceeded");
        return ApiError::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later.",
        )
        .into_response();
    }

    next.run(request).await
}
