// Axum 中间件

pub mod auth;

pub use auth::{attach_access_token, require_access_token};
