//! 集成测试共用的服务替身

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use word_reader::dictionary::DictionaryLookup;
use word_reader::{
    Completion, CompletionProvider, CompletionRequest, ReaderError, ReaderServices, Result,
    TokenUsage,
};

/// 按顺序返回预设结果，并记录收到的请求
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<Completion>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str, usage: Option<TokenUsage>) -> Self {
        self.push(Ok(Completion {
            text: text.to_string(),
            usage,
        }))
    }

    pub fn fail(self, error: ReaderError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<Completion>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ReaderError::Custom("no scripted reply left".into())))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// 固定返回给定释义的词典
pub struct StaticDictionary(pub Vec<String>);

impl StaticDictionary {
    pub fn with(meanings: &[&str]) -> Self {
        Self(meanings.iter().map(|m| m.to_string()).collect())
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }
}

#[async_trait]
impl DictionaryLookup for StaticDictionary {
    async fn lookup(&self, _word: &str) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// 总是失败的词典
pub struct FailingDictionary;

#[async_trait]
impl DictionaryLookup for FailingDictionary {
    async fn lookup(&self, _word: &str) -> Result<Vec<String>> {
        Err(ReaderError::ApiError {
            code: 404,
            message: "No Definitions Found".into(),
        })
    }
}

pub fn usage(prompt: u64, completion: u64) -> TokenUsage {
    TokenUsage::new(prompt, completion, prompt + completion)
}

pub fn services_with(
    provider: Option<Arc<ScriptedProvider>>,
    dictionary: impl DictionaryLookup + 'static,
) -> ReaderServices {
    ReaderServices::new(
        provider.map(|p| p as Arc<dyn CompletionProvider>),
        Arc::new(dictionary),
    )
}
