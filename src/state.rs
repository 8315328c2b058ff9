use crate::core::models::GatewayConfig;
use crate::error::ConfigError;
use crate::proxy::BackendClient;

/// Web 应用状态，启动后只读
pub struct AppState {
    pub config: GatewayConfig,
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let backend = BackendClient::new(&config.backend)?;
        Ok(Self { config, backend })
    }
}
