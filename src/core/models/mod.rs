//! 核心数据模型

mod config;

pub use config::{
    resolve_backend_env, BackendConfig, GatewayConfig, UpstreamProxyConfig, BACKEND_URL_ENV_VARS,
};
