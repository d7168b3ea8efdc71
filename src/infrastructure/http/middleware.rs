//! HTTP Middleware
//!
//! 请求耗时与 HTTP 状态码日志

use std::time::Instant;

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};

/// 超过该耗时的请求记为慢请求（插图运行除外）
const SLOW_REQUEST_MS: u128 = 3_000;

/// 请求日志中间件
///
/// 4xx 记 warn，5xx 记 error。业务错误（errno != 0）仍然返回 200，
/// 在 ApiError::into_response() 中记录
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            elapsed_ms,
            "HTTP client error"
        );
    } else if elapsed_ms > SLOW_REQUEST_MS && !uri.path().ends_with("/illustrate") {
        tracing::warn!(method = %method, uri = %uri, elapsed_ms, "Slow request");
    }

    response
}
