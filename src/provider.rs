//! 文本生成服务客户端
//!
//! [`CompletionProvider`] 是编排层与外部文本生成服务之间唯一的接缝：
//! 一条用户指令、输出 token 上限和温度进，生成文本与用量出。
//! [`OpenAiProvider`] 是基于 reqwest 的 chat/completions 实现。

use crate::error::{ReaderError, Result};
use crate::models::TokenUsage;
use crate::types::{
    ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ProviderConfig,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// 一次生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature,
        }
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// 首个候选的文本，服务未返回内容时为空字符串
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// 文本生成服务
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// 发送单条用户指令并返回生成结果
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;

    /// 服务名称，用于日志
    fn name(&self) -> &str;
}

/// 构建共享的 HTTP 客户端
pub fn build_http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(5)
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(concat!("word-reader/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to create configured HTTP client: {}, using default", e);
            Client::new()
        })
}

/// 兼容 OpenAI chat/completions 接口的服务
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, api_key: impl Into<String>, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            endpoint: format!(
                "{}/chat/completions",
                config.api_base_url.trim_end_matches('/')
            ),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "could not read error body".to_string());
            return Err(ReaderError::ApiError {
                code: status.as_u16(),
                message: error_message_from_body(&error_text),
            });
        }

        let payload: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ReaderError::ParseError(format!("invalid completion payload: {}", e)))?;

        Ok(completion_from_response(payload))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// 取首个候选的文本与用量
pub fn completion_from_response(payload: ChatCompletionResponse) -> Completion {
    let text = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default();

    Completion {
        text,
        usage: payload.usage,
    }
}

/// 优先使用 `{"error": {"message"}}` 中的消息，否则返回原始文本
fn error_message_from_body(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "empty error body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
