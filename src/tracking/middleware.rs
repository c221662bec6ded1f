use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Response},
    middleware::Next,
};
use http::HeaderName;
use tracing::Instrument;

use crate::tracking::error::Result;
use crate::tracking::request_id::RequestId;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Tags the request with a fresh [`RequestId`] and echoes it in the
/// `x-request-id` response header.
pub async fn request_id(mut req: Request, next: Next) -> Result<Response<Body>> {
    let request_id = RequestId::new();
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    response.headers_mut().insert(
        REQUEST_ID_HEADER.clone(),
        HeaderValue::from_str(request_id.as_str())?,
    );

    Ok(response)
}

/// Runs the request inside a span carrying its id, method and path, then logs
/// status and latency.
pub async fn observability(req: Request, next: Next) -> Response<Body> {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.as_str())
        .unwrap_or("<missing>")
        .to_owned();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let response = next.run(req).instrument(span).await;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            latency_ms = start.elapsed().as_millis(),
            status,
            "request failed"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            latency_ms = start.elapsed().as_millis(),
            status,
            "request"
        );
    }

    response
}
