// 后端客户端 - 单次请求转发，不重试

use bytes::Bytes;
use reqwest::{header, Client, Method, Response};
use serde_json::Value;
use tokio::time::Duration;

use crate::core::models::BackendConfig;
use crate::error::{ConfigError, ProxyError};
use crate::proxy::token::AccessToken;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const USER_AGENT: &str = concat!("portal-gateway/", env!("CARGO_PKG_VERSION"));

/// 出站请求体
pub enum CallBody {
    Empty,
    Json(Value),
    /// Forwarded as-is with the inbound content type (uploads).
    Raw {
        content_type: Option<header::HeaderValue>,
        body: Bytes,
    },
}

/// 描述一次后端调用
pub struct BackendCall<'a> {
    method: Method,
    path: String,
    query: Option<&'a str>,
    token: Option<&'a AccessToken>,
    request_id: Option<&'a str>,
    accept: &'static str,
    body: CallBody,
}

impl<'a> BackendCall<'a> {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            token: None,
            request_id: None,
            accept: "application/json",
            body: CallBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn token(mut self, token: Option<&'a AccessToken>) -> Self {
        self.token = token;
        self
    }

    pub fn request_id(mut self, request_id: &'a str) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn query(mut self, query: Option<&'a str>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn accept(mut self, accept: &'static str) -> Self {
        self.accept = accept;
        self
    }

    pub fn json(mut self, body: Option<Value>) -> Self {
        self.body = body.map_or(CallBody::Empty, CallBody::Json);
        self
    }

    pub fn raw(mut self, body: Bytes, content_type: Option<header::HeaderValue>) -> Self {
        self.body = CallBody::Raw { content_type, body };
        self
    }
}

pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(USER_AGENT);

        let proxy = &config.upstream_proxy;
        if proxy.enabled && !proxy.url.is_empty() {
            let upstream =
                reqwest::Proxy::all(&proxy.url).map_err(|source| ConfigError::InvalidUpstreamProxy {
                    url: proxy.url.clone(),
                    source,
                })?;
            builder = builder.proxy(upstream);
            tracing::info!("BackendClient enabled upstream proxy: {}", proxy.url);
        }

        let http_client = builder.build().map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins base and path with exactly one `/`.
    pub fn build_url(&self, path: &str, query: Option<&str>) -> String {
        let path = path.trim_start_matches('/');
        match query {
            Some(qs) => format!("{}/{}?{}", self.base_url, path, qs),
            None => format!("{}/{}", self.base_url, path),
        }
    }

    /// 发送单次后端请求；任何 HTTP 状态码都原样返回给调用方
    pub async fn send(&self, call: BackendCall<'_>) -> Result<Response, ProxyError> {
        let url = self.build_url(&call.path, call.query);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(call.accept),
        );
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        );
        if let Some(token) = call.token {
            headers.insert(header::AUTHORIZATION, token.bearer_header().clone());
        }
        if let Some(id) = call.request_id {
            if let Ok(value) = header::HeaderValue::from_str(id) {
                headers.insert(REQUEST_ID_HEADER, value);
            }
        }

        let request = self.http_client.request(call.method.clone(), &url);
        let request = match call.body {
            CallBody::Empty => request.headers(headers),
            CallBody::Json(body) => {
                headers.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static("application/json"),
                );
                request.headers(headers).json(&body)
            }
            CallBody::Raw { content_type, body } => {
                if let Some(ct) = content_type {
                    headers.insert(header::CONTENT_TYPE, ct);
                }
                request.headers(headers).body(body)
            }
        };

        tracing::debug!(
            authenticated = call.token.is_some(),
            "-> backend {} {}",
            call.method,
            url
        );

        let response = request.send().await?;

        tracing::debug!("<- backend {} {}: {}", call.method, url, response.status());
        Ok(response)
    }
}
