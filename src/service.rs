//! 服务装配
//!
//! 根据配置构建查词、段落生成、翻译三个编排组件，它们共享同一个文本生成服务。

use crate::config::AppConfig;
use crate::dictionary::{DictionaryLookup, FreeDictionaryClient};
use crate::generator::ParagraphGenerator;
use crate::provider::{build_http_client, CompletionProvider, OpenAiProvider};
use crate::resolver::DefinitionResolver;
use crate::translator::TranslationService;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 三个编排组件的集合
#[derive(Clone)]
pub struct ReaderServices {
    pub resolver: DefinitionResolver,
    pub generator: ParagraphGenerator,
    pub translator: TranslationService,
}

impl ReaderServices {
    pub fn new(
        provider: Option<Arc<dyn CompletionProvider>>,
        dictionary: Arc<dyn DictionaryLookup>,
    ) -> Self {
        Self {
            resolver: DefinitionResolver::new(provider.clone(), dictionary),
            generator: ParagraphGenerator::new(provider.clone()),
            translator: TranslationService::new(provider),
        }
    }

    /// 有密钥时接入 OpenAI 兼容服务，否则各组件走回退路径
    pub fn from_config(config: &AppConfig) -> Self {
        let provider_config = &config.settings.provider;
        let client = build_http_client(Duration::from_secs(provider_config.request_timeout_secs));

        let provider = config.credentials.api_key().map(|key| {
            info!(model = %provider_config.model, "text generation provider configured");
            Arc::new(OpenAiProvider::new(client.clone(), key, provider_config))
                as Arc<dyn CompletionProvider>
        });
        let dictionary = Arc::new(FreeDictionaryClient::new(
            client,
            provider_config.dictionary_url.clone(),
        ));

        Self::new(provider, dictionary)
    }
}
