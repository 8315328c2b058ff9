pub mod api;
pub mod core;
pub mod error;
pub mod proxy;
pub mod state;

pub use error::{ConfigError, ProxyError};
pub use state::AppState;
