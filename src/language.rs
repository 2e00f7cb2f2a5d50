//! 语言注册表
//!
//! 支持的语言代码与显示名称的静态映射。所有来自外部的语言参数在使用前
//! 都必须经过 [`resolve_language`] 归一化。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 支持的内容语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    Zh,
    Ja,
    En,
    Es,
    Fr,
    De,
    Pt,
    It,
}

impl Language {
    /// 全部支持的语言，按界面展示顺序排列
    pub const ALL: [Language; 9] = [
        Language::Ko,
        Language::Zh,
        Language::Ja,
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Pt,
        Language::It,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::Zh => "zh",
            Language::Ja => "ja",
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Pt => "pt",
            Language::It => "it",
        }
    }

    /// 用于提示词的英文名称
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Ko => "Korean",
            Language::Zh => "Chinese",
            Language::Ja => "Japanese",
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::Pt => "Portuguese",
            Language::It => "Italian",
        }
    }

    /// 精确匹配语言代码（已小写）
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 归一化外部传入的语言代码
///
/// 去除首尾空白并转为小写；缺失或不受支持时返回 `fallback`。
///
/// # 示例
///
/// ```rust
/// use word_reader::{resolve_language, Language};
///
/// assert_eq!(resolve_language(Some("FR"), Language::Ko), Language::Fr);
/// assert_eq!(resolve_language(Some("xx"), Language::Ko), Language::Ko);
/// assert_eq!(resolve_language(None, Language::En), Language::En);
/// ```
pub fn resolve_language(code: Option<&str>, fallback: Language) -> Language {
    code.map(|c| c.trim().to_lowercase())
        .and_then(|c| Language::from_code(&c))
        .unwrap_or(fallback)
}
