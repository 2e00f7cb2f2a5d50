//! 段落生成编排
//!
//! 难度映射为五个词汇/句长档位，拼出生成指令；未配置服务或调用失败时
//! 返回固定回退段落，错误以 `error_message` 随结果带回，不会向上抛出。

use crate::error::ReaderError;
use crate::models::{ParagraphRequest, ParagraphResult};
use crate::provider::{CompletionProvider, CompletionRequest};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

const PARAGRAPH_MAX_TOKENS: u32 = 200;
const PARAGRAPH_TEMPERATURE: f32 = 1.0;

/// 难度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyTier {
    Elementary,
    Easy,
    Intermediate,
    Advanced,
    VeryAdvanced,
}

impl DifficultyTier {
    /// 1–2 初级，3–4 简单，5–6 中级，7–8 高级，9–10 非常高级；超出范围先截断
    pub fn from_level(level: i64) -> Self {
        match level.clamp(1, 10) {
            1..=2 => DifficultyTier::Elementary,
            3..=4 => DifficultyTier::Easy,
            5..=6 => DifficultyTier::Intermediate,
            7..=8 => DifficultyTier::Advanced,
            _ => DifficultyTier::VeryAdvanced,
        }
    }

    pub fn rule(self) -> &'static str {
        match self {
            DifficultyTier::Elementary => {
                "Elementary level (grade-school). Very simple words only, \
                 very short sentences (under 10 words). Daily life only"
            }
            DifficultyTier::Easy => {
                "Easy (A1–A2). Simple everyday vocabulary. \
                 Short sentences (under 15 words). Familiar topics only"
            }
            DifficultyTier::Intermediate => {
                "Intermediate (B1–B2). Normal vocabulary and sentence length. \
                 General interest, work or life"
            }
            DifficultyTier::Advanced => {
                "Advanced (C1). Rich vocabulary, longer sentences. \
                 Can be professional or abstract"
            }
            DifficultyTier::VeryAdvanced => {
                "Very advanced (C2). Sophisticated, nuanced vocabulary and complex sentences. \
                 Specialized or academic style"
            }
        }
    }
}

/// 构造段落生成指令
pub fn paragraph_prompt(request: &ParagraphRequest) -> String {
    let tier = DifficultyTier::from_level(request.difficulty.into());
    let language = request.language.display_name();

    let mut prompt = format!(
        "Write one short {language} paragraph (80–120 words). Rules: {}.",
        tier.rule()
    );
    if let Some(profession) = &request.profession {
        prompt.push_str(&format!(
            " The paragraph should be relevant to someone working in or studying: \
             \"{profession}\". Use vocabulary and situations useful in that field."
        ));
    }
    if let Some(style) = &request.style {
        prompt.push_str(&format!(" Write it in this style or tone: \"{style}\"."));
    }
    prompt.push_str(
        " No questions, no lists, no headings, plain text only. Output only the paragraph.",
    );
    prompt
}

/// 段落生成服务
#[derive(Clone)]
pub struct ParagraphGenerator {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl ParagraphGenerator {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    /// 生成一段阅读材料
    ///
    /// 总是返回结果：未配置服务时返回不带错误信息的回退段落，
    /// 调用失败或返回空内容时返回带 `error_message` 的回退段落。
    pub async fn generate(&self, request: &ParagraphRequest) -> ParagraphResult {
        let Some(provider) = &self.provider else {
            info!("no provider configured, using fallback paragraph");
            return ParagraphResult::fallback(None);
        };

        let completion_request = CompletionRequest::new(
            paragraph_prompt(request),
            PARAGRAPH_MAX_TOKENS,
            PARAGRAPH_TEMPERATURE,
        );

        let outcome = provider.complete(&completion_request).await.and_then(|completion| {
            let content = completion.text.trim();
            if content.is_empty() {
                Err(ReaderError::EmptyResponse)
            } else {
                Ok((content.to_string(), completion.usage))
            }
        });

        match outcome {
            Ok((content, usage)) => {
                info!(
                    difficulty = request.difficulty,
                    language = %request.language,
                    "new paragraph generated"
                );
                ParagraphResult {
                    id: Uuid::new_v4().to_string(),
                    created_at: Utc::now(),
                    content,
                    is_fallback: false,
                    error_message: None,
                    usage,
                }
            }
            Err(e) => {
                error!(provider = provider.name(), "paragraph generation failed: {}", e);
                ParagraphResult::fallback(Some(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    #[test]
    fn tiers_follow_level_boundaries() {
        use DifficultyTier::*;
        let expected = [
            (0, Elementary),
            (1, Elementary),
            (2, Elementary),
            (3, Easy),
            (4, Easy),
            (5, Intermediate),
            (6, Intermediate),
            (7, Advanced),
            (8, Advanced),
            (9, VeryAdvanced),
            (10, VeryAdvanced),
            (15, VeryAdvanced),
        ];
        for (level, tier) in expected {
            assert_eq!(DifficultyTier::from_level(level), tier, "level {level}");
        }
    }

    #[test]
    fn prompt_includes_modifiers_only_when_present() {
        let plain = paragraph_prompt(&ParagraphRequest::new(5, None, None, Language::En));
        assert!(plain.starts_with("Write one short English paragraph (80–120 words)."));
        assert!(plain.contains("Intermediate (B1–B2)"));
        assert!(!plain.contains("relevant to someone"));
        assert!(!plain.contains("style or tone"));

        let styled = paragraph_prompt(&ParagraphRequest::new(
            9,
            Some("nurse"),
            Some("humorous"),
            Language::Es,
        ));
        assert!(styled.contains("Spanish paragraph"));
        assert!(styled.contains("\"nurse\""));
        assert!(styled.contains("\"humorous\""));
        assert!(styled.contains("Very advanced (C2)"));
    }

    #[test]
    fn clamped_levels_build_identical_prompts() {
        let low = paragraph_prompt(&ParagraphRequest::new(0, None, None, Language::En));
        let one = paragraph_prompt(&ParagraphRequest::new(1, None, None, Language::En));
        assert_eq!(low, one);

        let high = paragraph_prompt(&ParagraphRequest::new(15, None, None, Language::En));
        let ten = paragraph_prompt(&ParagraphRequest::new(10, None, None, Language::En));
        assert_eq!(high, ten);
    }
}
