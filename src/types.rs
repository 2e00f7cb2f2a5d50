//! 类型定义模块
//!
//! 定义配置结构以及与文本生成服务、词典服务交互时使用的数据结构。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 文本生成服务配置
///
/// # 字段说明
///
/// * `model` - 模型标识，环境变量 `OPENAI_MODEL` 可覆盖
/// * `api_base_url` - 兼容 OpenAI 的 API 根地址
/// * `dictionary_url` - 公共词典查询地址，单词会作为最后一段路径拼接
/// * `request_timeout_secs` - 单次 HTTP 请求的超时时间（秒）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub model: String,
    pub api_base_url: String,
    pub dictionary_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            dictionary_url: "https://api.dictionaryapi.dev/api/v2/entries/en".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Web 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// 获取完整的监听地址
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// 速率限制配置
///
/// # 字段说明
///
/// * `max_requests` - 窗口内每个客户端允许的最大请求数
/// * `window_ms` - 滑动窗口长度（毫秒）
/// * `sweep_interval_secs` - 定期清理过期客户端的间隔（秒）
/// * `sweep_threshold` - 跟踪的客户端数量超过该值时立即清理
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_ms: u64,
    pub sweep_interval_secs: u64,
    pub sweep_threshold: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 15,
            window_ms: 60_000,
            sweep_interval_secs: 60,
            sweep_threshold: 10_000,
        }
    }
}

/// 每百万 token 的美元单价
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_per_million: 0.15,
            output_per_million: 0.60,
        }
    }
}

impl PricingConfig {
    pub fn estimate(&self, prompt_tokens: u64, completion_tokens: u64) -> f64 {
        (prompt_tokens as f64 * self.input_per_million
            + completion_tokens as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

/// 客户端本地状态的存储位置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("word-reader-state.json"),
        }
    }
}

/// 单条对话消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// chat/completions 请求体
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// chat/completions 响应体（只保留用到的字段）
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<crate::models::TokenUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

/// 服务端错误响应：`{"error": {"message": "..."}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

/// 词典服务响应中的一个词条
#[derive(Debug, Deserialize)]
pub struct DictionaryEntry {
    #[serde(default)]
    pub meanings: Vec<DictionaryMeaning>,
}

#[derive(Debug, Deserialize)]
pub struct DictionaryMeaning {
    #[serde(default)]
    pub definitions: Vec<DictionaryDefinition>,
}

#[derive(Debug, Deserialize)]
pub struct DictionaryDefinition {
    pub definition: Option<String>,
}
