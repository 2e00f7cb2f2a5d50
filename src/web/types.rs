//! Web 模块的数据类型定义

use crate::config::CredentialReport;
use crate::rate_limit::SlidingWindowLimiter;
use crate::service::ReaderServices;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub services: ReaderServices,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub credentials: CredentialReport,
}

/// `GET /define` 查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineParams {
    pub word: Option<String>,
    pub lang: Option<String>,
    pub from_lang: Option<String>,
}

/// `GET /generate` 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct GenerateParams {
    pub difficulty: Option<String>,
    pub profession: Option<String>,
    pub style: Option<String>,
    pub lang: Option<String>,
}

/// `POST /translate` 请求体
#[derive(Debug, Default, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
}

/// 翻译失败响应，`translation` 固定为 null
#[derive(Debug, Serialize)]
pub struct TranslateFailure {
    pub translation: Option<String>,
    pub error: String,
}

impl TranslateFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            translation: None,
            error: error.into(),
        }
    }
}

/// 速率限制响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedBody {
    pub error: String,
    pub retry_after_seconds: u64,
}
