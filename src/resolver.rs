//! 查词编排
//!
//! 校验输入 → 调用文本生成服务 → 失败时按回退策略处理 → 统一结果形态。
//! 任何情况下都返回至少一条释义。

use crate::dictionary::{DictionaryLookup, MAX_DEFINITIONS};
use crate::language::Language;
use crate::models::DefinitionResult;
use crate::provider::{CompletionProvider, CompletionRequest};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFINITION_MAX_TOKENS: u32 = 60;
const DEFINITION_TEMPERATURE: f32 = 0.3;

/// 查词服务
#[derive(Clone)]
pub struct DefinitionResolver {
    provider: Option<Arc<dyn CompletionProvider>>,
    dictionary: Arc<dyn DictionaryLookup>,
}

impl DefinitionResolver {
    /// `provider` 为 `None` 表示未配置密钥
    pub fn new(
        provider: Option<Arc<dyn CompletionProvider>>,
        dictionary: Arc<dyn DictionaryLookup>,
    ) -> Self {
        Self {
            provider,
            dictionary,
        }
    }

    /// 查询单词在目标语言中的释义
    ///
    /// `word` 应已归一化，语言参数应已经过 [`resolve_language`](crate::resolve_language)。
    /// 只有当目标语言是英文且未指定源语言时，才会回退到公共词典；
    /// 其余失败情况直接返回占位释义。
    pub async fn resolve(
        &self,
        word: &str,
        target: Language,
        source: Option<Language>,
    ) -> DefinitionResult {
        let word = word.trim();
        if word.is_empty() {
            return DefinitionResult::sentinel(word);
        }

        let Some(provider) = &self.provider else {
            debug!(word, "no provider configured, using fallback");
            return self.fallback(word, target, source).await;
        };

        let request = CompletionRequest::new(
            definition_prompt(word, target, source),
            DEFINITION_MAX_TOKENS,
            DEFINITION_TEMPERATURE,
        );

        match provider.complete(&request).await {
            Ok(completion) => {
                let meanings = parse_meanings(&completion.text);
                if meanings.is_empty() {
                    warn!(word, provider = provider.name(), "empty definition from provider");
                    return self.fallback(word, target, source).await;
                }
                DefinitionResult {
                    word: word.to_string(),
                    meanings,
                    usage: completion.usage,
                }
            }
            Err(e) => {
                warn!(word, provider = provider.name(), "definition request failed: {}", e);
                self.fallback(word, target, source).await
            }
        }
    }

    async fn fallback(
        &self,
        word: &str,
        target: Language,
        source: Option<Language>,
    ) -> DefinitionResult {
        if target != Language::En || source.is_some() {
            return DefinitionResult::sentinel(word);
        }

        match self.dictionary.lookup(word).await {
            Ok(meanings) if !meanings.is_empty() => DefinitionResult {
                word: word.to_string(),
                meanings,
                usage: None,
            },
            Ok(_) => DefinitionResult::sentinel(word),
            Err(e) => {
                debug!(word, "dictionary lookup failed: {}", e);
                DefinitionResult::sentinel(word)
            }
        }
    }
}

/// 构造查词指令
pub fn definition_prompt(word: &str, target: Language, source: Option<Language>) -> String {
    let target_name = target.display_name();
    let source_name = match source {
        Some(lang) if lang != Language::En => lang.display_name(),
        _ => Language::En.display_name(),
    };
    format!(
        "Give the meaning of the {source_name} word \"{word}\" in {target_name}. \
         Return 1–2 short definitions only, one per line, in {target_name} only. \
         No numbers, bullets, or extra explanation. Output only the definitions."
    )
}

/// 按行切分、去空白、丢弃空行，最多取前两行
pub fn parse_meanings(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_DEFINITIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_first_two_non_empty_lines() {
        assert_eq!(
            parse_meanings("\n  달리다 \n\n뛰다\n도망치다\n"),
            ["달리다", "뛰다"]
        );
        assert!(parse_meanings(" \n \n").is_empty());
    }

    #[test]
    fn prompt_names_source_and_target() {
        let prompt = definition_prompt("courir", Language::Ko, Some(Language::Fr));
        assert!(prompt.contains("French word \"courir\""));
        assert!(prompt.contains("in Korean only"));
    }

    #[test]
    fn prompt_assumes_english_without_source() {
        let prompt = definition_prompt("run", Language::Ja, None);
        assert!(prompt.starts_with("Give the meaning of the English word \"run\" in Japanese."));
    }
}
