// proxy 模块 - 后端转发

pub mod mappers; // 错误分类
pub mod middleware; // 鉴权中间件
pub mod relay; // 后端响应回传
pub mod token; // access token 解析
pub mod upstream; // 后端客户端

pub use token::{resolve_access_token, AccessToken, TokenPair, TOKEN_COOKIE_NAME};
pub use upstream::{BackendCall, BackendClient};
