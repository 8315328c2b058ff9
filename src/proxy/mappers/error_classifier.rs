// 错误分类模块 - 将 reqwest 底层错误转换为可以返回给浏览器的简短消息
use reqwest::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedError {
    /// 用于日志的错误类型
    pub kind: &'static str,
    /// 放入错误信封的英文消息
    pub message: &'static str,
}

/// 分类后端调用错误
pub fn classify_upstream_error(error: &Error) -> ClassifiedError {
    if error.is_timeout() {
        ClassifiedError {
            kind: "timeout_error",
            message: "Backend request timed out",
        }
    } else if error.is_connect() {
        ClassifiedError {
            kind: "connection_error",
            message: "Could not connect to backend",
        }
    } else if error.is_decode() {
        ClassifiedError {
            kind: "decode_error",
            message: "Failed to decode backend response",
        }
    } else if error.is_body() {
        ClassifiedError {
            kind: "stream_error",
            message: "Backend response was interrupted",
        }
    } else if error.is_builder() {
        ClassifiedError {
            kind: "request_error",
            message: "Failed to build backend request",
        }
    } else {
        ClassifiedError {
            kind: "unknown_error",
            message: "Internal server error",
        }
    }
}
