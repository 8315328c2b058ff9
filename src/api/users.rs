use axum::{
    extract::{Extension, State},
    response::Response,
};
use std::sync::Arc;

use super::common::RequestId;
use crate::error::ProxyError;
use crate::proxy::{relay, AccessToken, BackendCall};
use crate::state::AppState;

/// 当前登录用户信息
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Response, ProxyError> {
    let call = BackendCall::get("users/me")
        .token(Some(&token))
        .request_id(request_id.as_str());
    relay::json(state.backend.send(call).await?).await
}
