//! 生词本与偏好设置

use crate::error::Result;
use crate::language::{resolve_language, Language};
use crate::models::SavedWord;
use crate::storage::KeyValueStore;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::debug;

pub const SAVED_WORDS_KEY: &str = "saved_words_v1";
pub const DEFINITION_LANGUAGE_KEY: &str = "definition_language_v1";
pub const PARAGRAPH_LANGUAGE_KEY: &str = "paragraph_language_v1";
pub const SENTENCE_STYLE_KEY: &str = "sentence_style_v1";

/// 生词本
///
/// 单词以小写形式保存，大小写不敏感地去重，最新保存的排在最前。
#[derive(Clone)]
pub struct WordList {
    store: Arc<dyn KeyValueStore>,
}

impl WordList {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 全部条目；缺失或损坏时为空
    pub fn list(&self) -> Vec<SavedWord> {
        self.store
            .get(SAVED_WORDS_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(words) => Some(words),
                Err(e) => {
                    debug!("Ignoring corrupt word list: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, word: &str) -> bool {
        let key = word.to_lowercase();
        self.list().iter().any(|saved| saved.word.to_lowercase() == key)
    }

    /// 以当天的 UTC 日期保存单词；已存在时不做任何修改
    pub fn save(&self, word: &str, meaning: &str) -> Result<Vec<SavedWord>> {
        self.save_on(word, meaning, Utc::now().date_naive())
    }

    pub fn save_on(&self, word: &str, meaning: &str, date: NaiveDate) -> Result<Vec<SavedWord>> {
        let mut words = self.list();
        let key = word.to_lowercase();
        if words.iter().any(|saved| saved.word.to_lowercase() == key) {
            return Ok(words);
        }

        words.insert(
            0,
            SavedWord {
                word: key,
                meaning: meaning.to_string(),
                date_added: date,
            },
        );
        self.write(&words)?;
        Ok(words)
    }

    /// 大小写不敏感地删除
    pub fn remove(&self, word: &str) -> Result<Vec<SavedWord>> {
        let key = word.to_lowercase();
        let mut words = self.list();
        words.retain(|saved| saved.word.to_lowercase() != key);
        self.write(&words)?;
        Ok(words)
    }

    fn write(&self, words: &[SavedWord]) -> Result<()> {
        self.store.set(SAVED_WORDS_KEY, &serde_json::to_string(words)?)
    }
}

/// 用户偏好：释义语言、段落语言、句子风格
///
/// 每项独立读写，缺失或无效时使用默认值。
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub const DEFAULT_DEFINITION_LANGUAGE: Language = Language::Ko;
    pub const DEFAULT_PARAGRAPH_LANGUAGE: Language = Language::En;

    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn definition_language(&self) -> Language {
        resolve_language(
            self.store.get(DEFINITION_LANGUAGE_KEY).as_deref(),
            Self::DEFAULT_DEFINITION_LANGUAGE,
        )
    }

    pub fn set_definition_language(&self, language: Language) -> Result<()> {
        self.store.set(DEFINITION_LANGUAGE_KEY, language.code())
    }

    pub fn paragraph_language(&self) -> Language {
        resolve_language(
            self.store.get(PARAGRAPH_LANGUAGE_KEY).as_deref(),
            Self::DEFAULT_PARAGRAPH_LANGUAGE,
        )
    }

    pub fn set_paragraph_language(&self, language: Language) -> Result<()> {
        self.store.set(PARAGRAPH_LANGUAGE_KEY, language.code())
    }

    /// 空字符串表示未设置
    pub fn sentence_style(&self) -> String {
        self.store.get(SENTENCE_STYLE_KEY).unwrap_or_default()
    }

    pub fn set_sentence_style(&self, style: &str) -> Result<()> {
        self.store.set(SENTENCE_STYLE_KEY, style.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn newest_word_first_and_lowercased() {
        let words = WordList::new(Arc::new(MemoryStore::new()));
        words.save_on("Resilient", "able to recover", date(1)).unwrap();
        let list = words.save_on("run", "달리다", date(2)).unwrap();

        assert_eq!(list[0].word, "run");
        assert_eq!(list[1].word, "resilient");
        assert_eq!(list[1].date_added, date(1));
    }

    #[test]
    fn duplicate_save_is_a_no_op() {
        let words = WordList::new(Arc::new(MemoryStore::new()));
        words.save_on("run", "first", date(1)).unwrap();
        let list = words.save_on("RUN", "second", date(2)).unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].meaning, "first");
        assert!(words.contains("Run"));
    }

    #[test]
    fn remove_is_case_insensitive() {
        let words = WordList::new(Arc::new(MemoryStore::new()));
        words.save_on("run", "달리다", date(1)).unwrap();
        words.save_on("학교", "school", date(1)).unwrap();

        let list = words.remove("RUN").unwrap();
        assert_eq!(list.len(), 1);
        assert!(!words.contains("run"));
        assert!(words.contains("학교"));
    }

    #[test]
    fn save_stamps_utc_date() {
        let words = WordList::new(Arc::new(MemoryStore::new()));
        let before = Utc::now().date_naive();
        let list = words.save("run", "달리다").unwrap();
        let after = Utc::now().date_naive();

        assert!(list[0].date_added == before || list[0].date_added == after);
    }

    #[test]
    fn corrupt_list_reads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(SAVED_WORDS_KEY, "not json").unwrap();
        assert!(WordList::new(store).list().is_empty());
    }

    #[test]
    fn preferences_default_and_coerce() {
        let store = Arc::new(MemoryStore::new());
        let prefs = Preferences::new(store.clone());
        assert_eq!(prefs.definition_language(), Language::Ko);
        assert_eq!(prefs.paragraph_language(), Language::En);
        assert_eq!(prefs.sentence_style(), "");

        store.set(DEFINITION_LANGUAGE_KEY, "klingon").unwrap();
        assert_eq!(prefs.definition_language(), Language::Ko);

        prefs.set_paragraph_language(Language::Ja).unwrap();
        prefs.set_sentence_style("  news article ").unwrap();
        assert_eq!(prefs.paragraph_language(), Language::Ja);
        assert_eq!(prefs.sentence_style(), "news article");
        assert_eq!(prefs.definition_language(), Language::Ko);
    }
}
