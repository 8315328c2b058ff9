// 映射模块 - 后端响应与错误的转换

pub mod error_classifier;
