// Access token 鉴权中间件
use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ProxyError;
use crate::proxy::token::resolve_access_token;

/// Rejects requests without a usable token with 401 before any backend call.
/// On success the `AccessToken` is stored in the request extensions.
pub async fn require_access_token(
    mut request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let Some(token) = resolve_access_token(request.headers()) else {
        tracing::debug!(
            "Rejecting {} {}: no access token",
            request.method(),
            request.uri().path()
        );
        return Err(ProxyError::Unauthorized);
    };

    tracing::trace!("Access token resolved from {:?}", token.source());
    request.extensions_mut().insert(token);
    Ok(next.run(request).await)
}

/// Public routes: attach the token when present, continue anonymously otherwise.
pub async fn attach_access_token(mut request: Request, next: Next) -> Response {
    if let Some(token) = resolve_access_token(request.headers()) {
        request.extensions_mut().insert(token);
    }
    next.run(request).await
}
