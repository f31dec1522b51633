//! Request correlation IDs.
//!
//! Each request gets an ID, either the caller's `x-request-id` or a fresh
//! UUID v4. The same ID lands on the tracing span, on the Sentry scope (so a
//! captured 5xx carries it as a tag), in the response header, and as
//! `requestId` in every JSON error body built by
//! [`AppError`](crate::error::AppError).

use axum::{
    Json,
    extract::Request,
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Span;
use uuid::Uuid;

use crate::error::ErrorBody;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied ID that is reused; longer ones are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

fn incoming_id(request: &Request) -> Option<String> {
    let id = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    (!id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN).then(|| id.to_owned())
}

/// Assign a request ID and attach it to logs, Sentry, and the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;

    // Error bodies produced by `AppError` are re-rendered with the ID
    if let Some(body) = response.extensions_mut().remove::<ErrorBody>() {
        let (mut parts, _) = response.into_parts();
        parts.headers.remove(header::CONTENT_LENGTH);
        let stamped = Json(ErrorBody {
            request_id: Some(request_id.clone()),
            ..body
        });
        response = Response::from_parts(parts, stamped.into_response().into_body());
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
