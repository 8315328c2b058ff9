use axum::{
    extract::{Extension, Path, State},
    response::Response,
};
use std::sync::Arc;

use super::common::RequestId;
use crate::error::ProxyError;
use crate::proxy::{relay, AccessToken, BackendCall};
use crate::state::AppState;

/// 科目 PDF，以流的形式原样回传
pub async fn get_subject_pdf(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Extension(request_id): Extension<RequestId>,
    Path(subject_code): Path<String>,
) -> Result<Response, ProxyError> {
    let call = BackendCall::get(format!("pdf/{}", urlencoding::encode(&subject_code)))
        .token(Some(&token))
        .request_id(request_id.as_str())
        .accept("application/pdf, application/json");
    Ok(relay::stream(state.backend.send(call).await?))
}
