//! Middleware for logging requests and responses.

use axum::{
    Json,
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{Error, transaction::MessageResponse};

/// The number of bytes of a body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body, in bytes, the middleware will buffer.
pub const REQUEST_BODY_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
///
/// Request bodies larger than [REQUEST_BODY_SIZE_LIMIT] bytes are refused
/// with 413 Payload Too Large before they reach a handler.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, REQUEST_BODY_SIZE_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(MessageResponse::new(format!(
                    "Request body could not be read within {REQUEST_BODY_SIZE_LIMIT} bytes"
                ))),
            )
                .into_response();
        }
    };
    log_request(&parts, &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return Error::InvalidBody(error.to_string()).into_response();
        }
    };
    log_response(&parts, &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

/// The body as text, cut at [LOG_BODY_LENGTH_LIMIT] bytes.
///
/// Returns `None` when the body fits within the limit.
fn truncated_text(body: &[u8]) -> Option<String> {
    (body.len() > LOG_BODY_LENGTH_LIMIT)
        .then(|| String::from_utf8_lossy(&body[..LOG_BODY_LENGTH_LIMIT]).into_owned())
}

fn log_request(parts: &request::Parts, body: &Bytes) {
    let text = String::from_utf8_lossy(body);

    match truncated_text(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {text:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {text:?}"),
    }
}

fn log_response(parts: &response::Parts, body: &Bytes) {
    let text = String::from_utf8_lossy(body);

    match truncated_text(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {text:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {text:?}"),
    }
}
