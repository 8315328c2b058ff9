//! 网关配置模型

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variables that may carry the backend base URL, highest precedence first.
pub const BACKEND_URL_ENV_VARS: [&str; 3] =
    ["BACKEND_URL", "NEXT_PUBLIC_API_URL", "NEXT_PUBLIC_BACKEND_URL"];

/// 网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_address: String,
    pub port: u16,
    pub enable_cors: bool,
    /// 上传接口允许的最大请求体 (字节)
    pub max_upload_bytes: usize,
    /// 日志目录 (按天滚动)，为空时只输出到控制台
    pub log_dir: Option<PathBuf>,
    pub backend: BackendConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
            max_upload_bytes: 25 * 1024 * 1024,
            log_dir: None,
            backend: BackendConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// 从 JSON 文件加载，缺失字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides the backend base URL from the environment, if any of the known
    /// variables is set. Returns the name of the variable that was used.
    pub fn apply_backend_env<F>(&mut self, lookup: F) -> Option<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (name, value) = resolve_backend_env(lookup)?;
        self.backend.base_url = Some(value);
        Some(name)
    }
}

/// 按优先级查找第一个非空的后端地址环境变量
pub fn resolve_backend_env<F>(lookup: F) -> Option<(&'static str, String)>
where
    F: Fn(&str) -> Option<String>,
{
    BACKEND_URL_ENV_VARS.iter().find_map(|name| {
        let value = lookup(name)?;
        let value = value.trim();
        (!value.is_empty()).then(|| (*name, value.to_string()))
    })
}

/// 后端服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: Option<String>,
    /// 后端请求超时时间(秒)
    pub request_timeout: u64,
    pub upstream_proxy: UpstreamProxyConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout: default_request_timeout(),
            upstream_proxy: UpstreamProxyConfig::default(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

impl BackendConfig {
    /// Validated base URL without a trailing slash.
    pub fn base_url(&self) -> Result<String, ConfigError> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBackendUrl)?;

        let invalid = |reason: String| ConfigError::InvalidBackendUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("query and fragment are not allowed".to_string()));
        }

        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

/// 上游代理配置 (出站请求走的代理)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UpstreamProxyConfig {
    /// 是否启用
    pub enabled: bool,
    /// 代理地址 (http://, https://, socks5://)
    pub url: String,
}
