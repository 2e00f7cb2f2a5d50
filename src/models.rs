//! 业务数据模型
//!
//! 查词结果、段落结果、token 用量与生词本条目。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

use crate::language::Language;

/// 查词彻底失败时填充的占位释义
pub const DEFINITION_SENTINEL: &str = "(Could not load definition)";

/// 回退段落的固定标识
pub const FALLBACK_ID: &str = "fallback";

/// 文本生成服务不可用或失败时使用的固定段落
pub const FALLBACK_PARAGRAPH: &str = "Morning light filled the kitchen as the smell of fresh \
    coffee drifted through the house. Outside the window, a small bird sat on the fence and \
    watched the garden below. The grass was still wet from the rain that had fallen during the \
    night. A few clouds moved slowly across the sky, but the sun was warm and bright. It felt \
    like the kind of day when everything moves at a gentle pace. People walked their dogs along \
    the quiet street, and children rode their bikes on the sidewalk. The neighborhood was calm \
    and peaceful, just like any other ordinary morning.";

/// 一次调用（或累计）消耗的 token 数
///
/// `total_tokens` 直接采用服务端上报的值，不做重新计算。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, other: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.saturating_add(other.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_add(other.completion_tokens),
            total_tokens: self.total_tokens.saturating_add(other.total_tokens),
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: TokenUsage) {
        *self = *self + other;
    }
}

/// 查词结果
///
/// `meanings` 永远不为空，最多两条。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionResult {
    pub word: String,
    pub meanings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl DefinitionResult {
    /// 只含占位释义的失败结果
    pub fn sentinel(word: &str) -> Self {
        Self {
            word: word.to_string(),
            meanings: vec![DEFINITION_SENTINEL.to_string()],
            usage: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.meanings.len() == 1 && self.meanings[0] == DEFINITION_SENTINEL
    }
}

/// 段落生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphRequest {
    /// 已限制在 [1, 10] 范围内的难度
    pub difficulty: u8,
    pub profession: Option<String>,
    pub style: Option<String>,
    pub language: Language,
}

impl ParagraphRequest {
    pub const MIN_DIFFICULTY: i64 = 1;
    pub const MAX_DIFFICULTY: i64 = 10;
    pub const DEFAULT_DIFFICULTY: i64 = 5;

    /// 构造请求，难度会被限制在 [1, 10]，空白的职业/风格视为未设置
    pub fn new(
        difficulty: i64,
        profession: Option<&str>,
        style: Option<&str>,
        language: Language,
    ) -> Self {
        let difficulty = difficulty.clamp(Self::MIN_DIFFICULTY, Self::MAX_DIFFICULTY) as u8;
        Self {
            difficulty,
            profession: non_blank(profession),
            style: non_blank(style),
            language,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 段落生成结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphResult {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ParagraphResult {
    /// 固定回退段落，`error_message` 为空表示未配置服务而非调用失败
    pub fn fallback(error_message: Option<String>) -> Self {
        Self {
            id: FALLBACK_ID.to_string(),
            created_at: Utc::now(),
            content: FALLBACK_PARAGRAPH.to_string(),
            is_fallback: true,
            error_message,
            usage: None,
        }
    }
}

/// 整段翻译结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// 生词本条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWord {
    pub word: String,
    pub meaning: String,
    pub date_added: NaiveDate,
}
