//! 网关错误类型
//! 启动阶段使用 `ConfigError`，请求阶段使用 `ProxyError`

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

use crate::api::common::ErrorEnvelope;
use crate::proxy::mappers::error_classifier::classify_upstream_error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no backend URL configured (use --backend-url, BACKEND_URL, NEXT_PUBLIC_API_URL or NEXT_PUBLIC_BACKEND_URL)")]
    MissingBackendUrl,

    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("invalid upstream proxy {url:?}: {source}")]
    InvalidUpstreamProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to read config file {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 单个请求范围内的错误，统一转换为 `{ success: false, message }`
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Unauthorized: no access token provided")]
    Unauthorized,

    #[error("invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("backend request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("backend returned a non-JSON body: {0}")]
    InvalidBackendJson(#[source] serde_json::Error),

    /// 请求体读取失败 (超出大小上限等)，沿用 axum 给出的状态码
    #[error("failed to read request body: {0}")]
    BodyRejected(#[from] BytesRejection),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Unauthorized => StatusCode::UNAUTHORIZED,
            ProxyError::BodyRejected(rejection) => rejection.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the envelope. Internal error chains stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ProxyError::Unauthorized => self.to_string(),
            ProxyError::InvalidBody(_) => "Invalid request body".to_string(),
            ProxyError::Upstream(e) => classify_upstream_error(e).message.to_string(),
            ProxyError::InvalidBackendJson(_) => "Invalid response from backend".to_string(),
            ProxyError::BodyRejected(rejection) => rejection.body_text(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else if status != StatusCode::UNAUTHORIZED {
            tracing::warn!("{}", self);
        }
        ErrorEnvelope::new(self.public_message()).into_response_with(status)
    }
}
