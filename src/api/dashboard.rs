use axum::{
    extract::{Extension, State},
    response::Response,
};
use std::sync::Arc;

use super::common::RequestId;
use crate::error::ProxyError;
use crate::proxy::{relay, AccessToken, BackendCall};
use crate::state::AppState;

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Response, ProxyError> {
    let call = BackendCall::get("dashboard")
        .token(Some(&token))
        .request_id(request_id.as_str());
    relay::json(state.backend.send(call).await?).await
}
