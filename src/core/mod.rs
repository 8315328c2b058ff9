//! 核心模块
//! 配置模型与日志初始化，不依赖 HTTP 层

pub mod logger;
pub mod models;

pub use models::{BackendConfig, GatewayConfig, UpstreamProxyConfig};
