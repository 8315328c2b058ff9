//! 考试流程接口：开始新测试 / 恢复未完成的测试

use axum::{
    extract::{rejection::BytesRejection, Extension, State},
    response::Response,
};
use bytes::Bytes;
use std::sync::Arc;

use super::common::{parse_json_body, RequestId};
use crate::error::ProxyError;
use crate::proxy::{relay, AccessToken, BackendCall};
use crate::state::AppState;

pub async fn start_test(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
    forward_post(&state, "tests/start", &token, &request_id, &body?).await
}

pub async fn resume_test(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
    forward_post(&state, "tests/resumeTest", &token, &request_id, &body?).await
}

async fn forward_post(
    state: &AppState,
    path: &str,
    token: &AccessToken,
    request_id: &RequestId,
    body: &Bytes,
) -> Result<Response, ProxyError> {
    let payload = parse_json_body(body)?;
    let call = BackendCall::post(path)
        .token(Some(token))
        .request_id(request_id.as_str())
        .json(payload);
    relay::json(state.backend.send(call).await?).await
}
