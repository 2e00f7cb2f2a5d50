//! 阅读会话
//!
//! 客户端一侧的编排：加载段落、点击单词查询释义并自动加入生词本、整段翻译，
//! 每次服务调用上报的用量都记入账本。
//!
//! 查询无法取消，快速连续点击时旧请求可能晚于新请求返回。每次点击领取一个递增的
//! 序号，返回时若已有更新的点击或段落加载，则丢弃该结果。

use crate::config::AppConfig;
use crate::error::Result;
use crate::language::Language;
use crate::ledger::{UsageLedger, UsageSnapshot};
use crate::models::{
    DefinitionResult, ParagraphRequest, ParagraphResult, SavedWord, TokenUsage, Translation,
};
use crate::service::ReaderServices;
use crate::storage::{FileStore, KeyValueStore};
use crate::text::{is_actionable, normalize, tokenize, Token};
use crate::types::PricingConfig;
use crate::words::{Preferences, WordList};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// 请求序号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// 单调递增的序号发放器
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: AtomicU64,
}

impl GenerationCounter {
    /// 领取新序号，之前领取的序号全部失效
    pub fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

/// 点击单词的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// 不是可查询的单词
    Ignored,
    /// 结果返回前已有更新的操作
    Stale { word: String },
    Defined {
        definition: DefinitionResult,
        /// 点击前是否已在生词本中
        already_saved: bool,
    },
}

/// 已加载的段落及其分词结果
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedParagraph {
    pub paragraph: ParagraphResult,
    pub tokens: Vec<Token>,
}

/// 阅读会话
pub struct ReadingSession {
    services: ReaderServices,
    ledger: UsageLedger,
    words: WordList,
    preferences: Preferences,
    generation: GenerationCounter,
}

impl ReadingSession {
    pub fn new(
        services: ReaderServices,
        store: Arc<dyn KeyValueStore>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            services,
            ledger: UsageLedger::new(store.clone(), pricing),
            words: WordList::new(store.clone()),
            preferences: Preferences::new(store),
            generation: GenerationCounter::default(),
        }
    }

    /// 使用配置中的状态文件和计价创建会话
    pub fn from_config(config: &AppConfig) -> Self {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::open(&config.settings.storage.path));
        Self::new(
            ReaderServices::from_config(config),
            store,
            config.settings.pricing,
        )
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// 按当前偏好的段落语言和句子风格生成新段落
    pub async fn load_paragraph(
        &self,
        difficulty: i64,
        profession: Option<&str>,
    ) -> LoadedParagraph {
        // Pending lookups belong to the previous paragraph.
        self.generation.begin();

        let style = self.preferences.sentence_style();
        let request = ParagraphRequest::new(
            difficulty,
            profession,
            Some(style.as_str()),
            self.preferences.paragraph_language(),
        );

        let paragraph = self.services.generator.generate(&request).await;
        self.record_usage(paragraph.usage).await;

        let tokens = tokenize(&paragraph.content);
        LoadedParagraph { paragraph, tokens }
    }

    /// 处理一次单词点击
    pub async fn click(&self, raw_token: &str) -> ClickOutcome {
        let word = normalize(raw_token);
        if !is_actionable(&word) {
            return ClickOutcome::Ignored;
        }

        let ticket = self.generation.begin();
        let already_saved = self.words.contains(&word);

        // English paragraphs keep the public dictionary fallback available.
        let source =
            Some(self.preferences.paragraph_language()).filter(|lang| *lang != Language::En);
        let definition = self
            .services
            .resolver
            .resolve(&word, self.preferences.definition_language(), source)
            .await;

        // Billed tokens count even when the result is discarded.
        self.record_usage(definition.usage).await;

        if !self.generation.is_current(ticket) {
            debug!(word = %word, "discarding stale definition");
            return ClickOutcome::Stale { word };
        }

        if !already_saved && !definition.is_sentinel() {
            let meaning = definition.meanings.first().cloned().unwrap_or_default();
            let words = self.words.clone();
            let key = word.clone();
            let saved = tokio::task::spawn_blocking(move || words.save(&key, &meaning)).await;
            match saved {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(word = %word, "failed to save word: {}", e),
                Err(e) => warn!(word = %word, "word save task failed: {}", e),
            }
        }

        ClickOutcome::Defined {
            definition,
            already_saved,
        }
    }

    /// 把段落翻译为当前的释义语言
    pub async fn translate_paragraph(&self, text: &str) -> Result<Translation> {
        let translation = self
            .services
            .translator
            .translate(text, self.preferences.definition_language())
            .await?;
        self.record_usage(translation.usage).await;
        Ok(translation)
    }

    pub fn usage(&self) -> UsageSnapshot {
        self.ledger.read()
    }

    pub fn reset_usage(&self) -> Result<()> {
        self.ledger.reset()
    }

    pub fn saved_words(&self) -> Vec<SavedWord> {
        self.words.list()
    }

    pub fn remove_word(&self, word: &str) -> Result<Vec<SavedWord>> {
        self.words.remove(word)
    }

    /// 存储写入可能落盘，放到阻塞线程池执行
    async fn record_usage(&self, usage: Option<TokenUsage>) {
        let Some(usage) = usage else {
            return;
        };
        let ledger = self.ledger.clone();
        match tokio::task::spawn_blocking(move || ledger.record(usage)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to record usage: {}", e),
            Err(e) => warn!("usage record task failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_invalidates_older() {
        let counter = GenerationCounter::default();
        let first = counter.begin();
        assert!(counter.is_current(first));

        let second = counter.begin();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }
}
