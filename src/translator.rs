//! 整段翻译服务
//!
//! 只做一次文本生成调用，不重试也没有回退文本：任意文本的译文无法用固定内容替代，
//! 所以未配置密钥、输入为空或调用失败都以错误返回给调用方。

use crate::error::{ReaderError, Result};
use crate::language::Language;
use crate::models::Translation;
use crate::provider::{CompletionProvider, CompletionRequest};
use std::sync::Arc;
use tracing::{error, info};

const TRANSLATION_MAX_TOKENS: u32 = 500;
const TRANSLATION_TEMPERATURE: f32 = 0.3;

/// 翻译服务
///
/// # 示例
///
/// ```rust
/// use word_reader::{Language, ReaderError, TranslationService};
///
/// #[tokio::main]
/// async fn main() {
///     // 未配置文本生成服务
///     let service = TranslationService::new(None);
///
///     let err = service.translate("Hello, world!", Language::Ko).await.unwrap_err();
///     assert!(matches!(err, ReaderError::ServiceUnavailable(_)));
/// }
/// ```
#[derive(Clone)]
pub struct TranslationService {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl TranslationService {
    /// 创建新的翻译服务实例
    ///
    /// # 参数
    ///
    /// * `provider` - 文本生成服务，`None` 表示未配置密钥
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    /// 是否配置了文本生成服务
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// 翻译文本
    ///
    /// # 参数
    ///
    /// * `text` - 要翻译的文本，段落结构会被保留
    /// * `target` - 目标语言
    ///
    /// # 返回
    ///
    /// * `Ok(Translation)` - 去除首尾空白的译文，以及服务上报的用量
    /// * `Err(ReaderError::ServiceUnavailable)` - 未配置密钥
    /// * `Err(ReaderError::InvalidInput)` - 文本为空
    /// * `Err(ReaderError)` - 调用失败时的原始错误
    pub async fn translate(&self, text: &str, target: Language) -> Result<Translation> {
        let Some(provider) = &self.provider else {
            return Err(ReaderError::ServiceUnavailable(format!(
                "{} is not set",
                crate::config::API_KEY_VAR
            )));
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(ReaderError::InvalidInput("Missing text".to_string()));
        }

        info!(chars = text.chars().count(), target = %target, "translating text");

        let request = CompletionRequest::new(
            translation_prompt(text, target),
            TRANSLATION_MAX_TOKENS,
            TRANSLATION_TEMPERATURE,
        );

        let completion = provider.complete(&request).await.map_err(|e| {
            error!(provider = provider.name(), "translation failed: {}", e);
            e
        })?;

        Ok(Translation {
            translation: completion.text.trim().to_string(),
            usage: completion.usage,
        })
    }
}

/// 构造翻译指令
pub fn translation_prompt(text: &str, target: Language) -> String {
    format!(
        "Translate the following text into {}. Preserve the paragraph structure. \
         Output only the translation, no explanation.\n\n{}",
        target.display_name(),
        text
    )
}
