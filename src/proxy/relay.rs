//! 后端响应回传
//! 状态码始终原样透传，不会被统一改写为 200 或 500

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Json, Response};
use futures::TryStreamExt;
use serde_json::Value;

use crate::error::ProxyError;
use crate::proxy::mappers::error_classifier::classify_upstream_error;

/// Headers copied from the backend when streaming a binary body.
const RELAYED_HEADERS: [header::HeaderName; 3] = [
    header::CONTENT_TYPE,
    header::CONTENT_DISPOSITION,
    header::CONTENT_LENGTH,
];

/// Relay a JSON backend response: status passes through, body is re-emitted as JSON.
///
/// An empty body gets a synthesized `{ success, message }` envelope with the same
/// status. A non-empty body that is not JSON is a parse failure.
pub async fn json(response: reqwest::Response) -> Result<Response, ProxyError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    let payload = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::json!({
            "success": status.is_success(),
            "message": status.canonical_reason().unwrap_or_default(),
        })
    } else {
        serde_json::from_slice::<Value>(&bytes).map_err(ProxyError::InvalidBackendJson)?
    };

    Ok(no_store((status, Json(payload)).into_response()))
}

/// Relay a binary backend response (PDF) without buffering it.
pub fn stream(response: reqwest::Response) -> Response {
    let status = response.status();
    let headers: Vec<(header::HeaderName, HeaderValue)> = RELAYED_HEADERS
        .iter()
        .filter_map(|name| {
            response
                .headers()
                .get(name)
                .map(|value| (name.clone(), value.clone()))
        })
        .collect();

    let body = response.bytes_stream().inspect_err(|e| {
        let classified = classify_upstream_error(e);
        tracing::warn!("Backend stream interrupted ({}): {}", classified.kind, e);
    });

    let mut relayed = Response::new(Body::from_stream(body));
    *relayed.status_mut() = status;
    relayed.headers_mut().extend(headers);
    no_store(relayed)
}

fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
