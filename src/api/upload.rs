use axum::{
    extract::{rejection::BytesRejection, Extension, State},
    http::{header, HeaderMap},
    response::Response,
};
use bytes::Bytes;
use std::sync::Arc;

use super::common::RequestId;
use crate::error::ProxyError;
use crate::proxy::{relay, AccessToken, BackendCall};
use crate::state::AppState;

/// 文件上传：请求体不做解析，按原 Content-Type 转发给后端
/// 大小上限由路由上的 `DefaultBodyLimit` 控制
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ProxyError> {
    let body = body?;
    let content_type = headers.get(header::CONTENT_TYPE).cloned();
    let call = BackendCall::post("s3-upload")
        .token(Some(&token))
        .request_id(request_id.as_str())
        .raw(body, content_type);
    relay::json(state.backend.send(call).await?).await
}
