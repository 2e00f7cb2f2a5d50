//! 错误处理模块
//!
//! 定义阅读助手中使用的错误类型和错误处理机制。

use thiserror::Error;

/// 阅读助手错误类型
///
/// 包含调用文本生成服务、词典服务以及本地存储时可能出现的各种错误情况。
///
/// # 变体说明
///
/// * `Http` - HTTP请求错误
/// * `Custom` - 自定义错误消息
/// * `RateLimited` - 速率限制错误，附带建议的重试秒数
/// * `ApiError` - API响应错误，包含状态码和消息
/// * `ParseError` - 解析错误
/// * `EmptyResponse` - 服务返回了空内容
/// * `ServiceUnavailable` - 未配置API密钥等导致服务不可用
/// * `InvalidInput` - 输入校验失败
/// * `Storage` - 本地存储读写失败
/// * `Config` - 配置文件错误
#[derive(Debug, Error)]
pub enum ReaderError {
    /// HTTP请求错误
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// 自定义错误消息
    #[error("{0}")]
    Custom(String),
    /// 速率限制错误
    #[error("Rate limit exceeded. Try again in {retry_after_secs} seconds.")]
    RateLimited {
        /// 建议的重试等待秒数
        retry_after_secs: u64,
    },
    /// API响应错误
    #[error("API error {code}: {message}")]
    ApiError {
        /// HTTP状态码
        code: u16,
        /// 错误消息
        message: String,
    },
    /// 解析错误
    #[error("Parse error: {0}")]
    ParseError(String),
    /// 服务返回了空内容
    #[error("Empty response from LLM")]
    EmptyResponse,
    /// 服务不可用
    #[error("{0}")]
    ServiceUnavailable(String),
    /// 输入无效
    #[error("{0}")]
    InvalidInput(String),
    /// 存储错误
    #[error("Storage error: {0}")]
    Storage(String),
    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),
    /// 文件读写错误
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<String> for ReaderError {
    fn from(error: String) -> Self {
        ReaderError::Custom(error)
    }
}

impl From<&str> for ReaderError {
    fn from(error: &str) -> Self {
        ReaderError::Custom(error.to_string())
    }
}

impl From<serde_json::Error> for ReaderError {
    fn from(error: serde_json::Error) -> Self {
        ReaderError::ParseError(error.to_string())
    }
}

/// 结果类型别名
///
/// 简化返回类型，使用 `ReaderError` 作为错误类型。
///
/// # 示例
///
/// ```rust
/// use word_reader::{Result, ReaderError};
///
/// fn example_function() -> Result<String> {
///     Err(ReaderError::InvalidInput("Missing text".to_string()))
/// }
///
/// assert!(example_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, ReaderError>;
