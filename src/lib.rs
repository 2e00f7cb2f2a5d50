//! # Word Reader
//!
//! 语言学习阅读助手的编排层：生成指定难度的外语段落，点击单词查询释义，
//! 整段翻译，并在本地记录生词本和用量。
//!
//! ## 主要特性
//!
//! - **释义查询**: 通过文本生成服务获取 1–2 个简短释义，失败时回退到公共英文词典
//! - **段落生成**: 10 级难度，可指定职业词汇和句子风格，失败时返回固定的回退段落
//! - **整段翻译**: 支持 9 种语言
//! - **速率限制**: 按客户端的滑动窗口限流
//! - **用量记账**: 累计 token 用量并按单价估算费用
//!
//! ## 快速开始
//!
//! ```rust
//! use std::sync::Arc;
//! use word_reader::{Language, MemoryStore, PricingConfig, ReaderServices, ReadingSession};
//! use word_reader::dictionary::DictionaryLookup;
//!
//! struct NoDictionary;
//!
//! #[async_trait::async_trait]
//! impl DictionaryLookup for NoDictionary {
//!     async fn lookup(&self, _word: &str) -> word_reader::Result<Vec<String>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 没有密钥时各组件走回退路径
//!     let services = ReaderServices::new(None, Arc::new(NoDictionary));
//!     let store = Arc::new(MemoryStore::new());
//!     let session = ReadingSession::new(services, store, PricingConfig::default());
//!
//!     let loaded = session.load_paragraph(3, None).await;
//!     assert!(loaded.paragraph.is_fallback);
//!     assert_eq!(session.preferences().definition_language(), Language::Ko);
//! }
//! ```
//!
//! ## 配置文件支持
//!
//! ```toml
//! [provider]
//! model = "gpt-4o-mini"
//! api_base_url = "https://api.openai.com/v1"
//!
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 3000
//!
//! [rate_limit]
//! max_requests = 15
//! window_ms = 60000
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod generator;
pub mod language;
pub mod ledger;
pub mod models;
pub mod provider;
pub mod rate_limit;
pub mod resolver;
pub mod service;
pub mod session;
pub mod storage;
pub mod text;
pub mod translator;
pub mod types;
pub mod web;
pub mod words;

pub use config::{AppConfig, CredentialReport, Credentials, ReaderLibConfig};
pub use error::{ReaderError, Result};
pub use generator::ParagraphGenerator;
pub use language::{resolve_language, Language};
pub use ledger::{UsageLedger, UsageSnapshot};
pub use models::{
    DefinitionResult, ParagraphRequest, ParagraphResult, SavedWord, TokenUsage, Translation,
};
pub use provider::{Completion, CompletionProvider, CompletionRequest, OpenAiProvider};
pub use rate_limit::{Admission, SlidingWindowLimiter};
pub use resolver::DefinitionResolver;
pub use service::ReaderServices;
pub use session::{ClickOutcome, LoadedParagraph, ReadingSession};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use translator::TranslationService;
pub use types::{PricingConfig, ProviderConfig, RateLimitConfig, ServerConfig, StorageConfig};
pub use web::WebServer;
