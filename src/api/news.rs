//! 新闻接口 (公开，有 token 时附带)

use axum::{
    extract::{Extension, Path, RawQuery, State},
    response::Response,
};
use std::sync::Arc;

use super::common::RequestId;
use crate::error::ProxyError;
use crate::proxy::{relay, AccessToken, BackendCall};
use crate::state::AppState;

pub async fn list_news(
    State(state): State<Arc<AppState>>,
    token: Option<Extension<AccessToken>>,
    Extension(request_id): Extension<RequestId>,
    RawQuery(query): RawQuery,
) -> Result<Response, ProxyError> {
    let call = BackendCall::get("news")
        .token(token.as_deref())
        .request_id(request_id.as_str())
        .query(query.as_deref());
    relay::json(state.backend.send(call).await?).await
}

pub async fn get_featured_news(
    State(state): State<Arc<AppState>>,
    token: Option<Extension<AccessToken>>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Response, ProxyError> {
    let call = BackendCall::get("news/featured")
        .token(token.as_deref())
        .request_id(request_id.as_str());
    relay::json(state.backend.send(call).await?).await
}

pub async fn get_news_article(
    State(state): State<Arc<AppState>>,
    token: Option<Extension<AccessToken>>,
    Extension(request_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Response, ProxyError> {
    let call = BackendCall::get(format!("news/{}", urlencoding::encode(&slug)))
        .token(token.as_deref())
        .request_id(request_id.as_str());
    relay::json(state.backend.send(call).await?).await
}
