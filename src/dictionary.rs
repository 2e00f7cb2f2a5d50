//! 公共词典回退查询
//!
//! 不计费的英文词典服务，只在未配置文本生成服务（或其失败）且目标语言为英文时使用。

use crate::error::{ReaderError, Result};
use crate::types::DictionaryEntry;
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

/// 单个单词最多返回的释义数
pub const MAX_DEFINITIONS: usize = 2;

/// 按拼写查询英文释义
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    /// 返回按顺序收集的释义（最多两条），可能为空
    async fn lookup(&self, word: &str) -> Result<Vec<String>>;
}

/// 基于 reqwest 的公共词典客户端
#[derive(Clone)]
pub struct FreeDictionaryClient {
    client: Client,
    base_url: String,
}

impl FreeDictionaryClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 把单词作为最后一段路径拼接，并进行百分号编码
    fn url_for(&self, word: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ReaderError::Config(format!("invalid dictionary url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ReaderError::Config("dictionary url cannot be a base".to_string()))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

#[async_trait]
impl DictionaryLookup for FreeDictionaryClient {
    async fn lookup(&self, word: &str) -> Result<Vec<String>> {
        let url = self.url_for(word)?;
        debug!(%url, "dictionary lookup");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReaderError::ApiError {
                code: status.as_u16(),
                message: format!("dictionary lookup failed for {:?}", word),
            });
        }

        let entries: Vec<DictionaryEntry> = response
            .json()
            .await
            .map_err(|e| ReaderError::ParseError(format!("invalid dictionary payload: {}", e)))?;

        Ok(extract_definitions(&entries))
    }
}

/// 依次扫描 词条 → 义项 → 释义，收集到两条非空释义即停止
pub fn extract_definitions(entries: &[DictionaryEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| &entry.meanings)
        .flat_map(|meaning| &meaning.definitions)
        .filter_map(|definition| definition.definition.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .take(MAX_DEFINITIONS)
        .map(str::to_string)
        .collect()
}
