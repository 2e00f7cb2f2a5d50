//! 文本分词与单词归一化
//!
//! 把段落切分成可点击的单元（保留空白、拉丁字母连写成词、中日韩字符逐字），
//! 并把点击到的原始片段归一化为查询键。

/// 分词单元的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// 连续空白
    Whitespace,
    /// 拉丁字母、撇号、连字符组成的连续片段
    Word,
    /// 单个中日韩或谚文字符
    Ideograph,
    /// 其余任意单个字符
    Other,
}

/// 分词结果中的一个单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }

    /// 空白以外的单元都可以作为点击目标
    pub fn is_clickable(&self) -> bool {
        self.kind != TokenKind::Whitespace
    }
}

/// Hiragana, Katakana, CJK Unified Ideographs, Hangul syllables.
pub fn is_cjk_hangul(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7A3}')
}

/// Alphabetic characters from the Latin blocks (Basic Latin through
/// Latin Extended-B, plus Latin Extended Additional).
pub fn is_latin_letter(c: char) -> bool {
    c.is_alphabetic() && matches!(c, '\u{0041}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}')
}

fn is_word_char(c: char) -> bool {
    is_latin_letter(c) || c == '\'' || c == '-'
}

/// 将文本切分为可点击单元
///
/// 从左到右贪婪匹配，优先级依次为：连续空白、连续拉丁词字符、
/// 单个中日韩/谚文字符、任意单个字符。所有单元按顺序拼接后与输入完全一致，
/// 且不会产生空单元。
///
/// # 示例
///
/// ```rust
/// use word_reader::text::{tokenize, TokenKind};
///
/// let tokens = tokenize("It's 좋은 day!");
/// let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["It's", " ", "좋", "은", " ", "day", "!"]);
/// assert_eq!(tokens[2].kind, TokenKind::Ideograph);
/// ```
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(first) = rest.chars().next() {
        let (kind, len) = if first.is_whitespace() {
            (TokenKind::Whitespace, run_length(rest, char::is_whitespace))
        } else if is_word_char(first) {
            (TokenKind::Word, run_length(rest, is_word_char))
        } else if is_cjk_hangul(first) {
            (TokenKind::Ideograph, first.len_utf8())
        } else {
            (TokenKind::Other, first.len_utf8())
        };

        let (head, tail) = rest.split_at(len);
        tokens.push(Token::new(kind, head));
        rest = tail;
    }

    tokens
}

/// 以 `pred` 开头的最长前缀的字节长度
fn run_length(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map(|(idx, _)| idx)
        .unwrap_or(s.len())
}

fn is_kept(c: char) -> bool {
    is_word_char(c) || is_cjk_hangul(c)
}

/// 将点击到的原始片段归一化为查询键
///
/// 删除拉丁字母、撇号、连字符和中日韩/谚文字符以外的所有字符；
/// 剩余部分若只含拉丁词字符则转为小写，否则原样返回。
/// 返回空字符串表示这不是一个可查询的单词。
///
/// # 示例
///
/// ```rust
/// use word_reader::text::normalize;
///
/// assert_eq!(normalize("RESILIENT"), "resilient");
/// assert_eq!(normalize("café!"), "café");
/// assert_eq!(normalize("“学习”"), "学习");
/// assert_eq!(normalize("42."), "");
/// ```
pub fn normalize(raw: &str) -> String {
    let kept: String = raw.chars().filter(|&c| is_kept(c)).collect();
    if kept.is_empty() {
        return kept;
    }

    if kept.chars().all(is_word_char) {
        // Some uppercase letters lower-case into combining sequences (İ -> i̇).
        kept.to_lowercase().chars().filter(|&c| is_kept(c)).collect()
    } else {
        kept
    }
}

/// 归一化结果是否值得发起查询
///
/// 至少两个字符，或包含中日韩/谚文字符（单个汉字也有意义），
/// 以避免误触单个拉丁字母。
pub fn is_actionable(normalized: &str) -> bool {
    normalized.chars().count() >= 2 || normalized.chars().any(is_cjk_hangul)
}

/// 把外部传入的查询词整理为查询键
///
/// 与 [`normalize`] 不同，这里不删除任何字符：只去除首尾空白，
/// 不含中日韩/谚文字符时转为小写。数字和词组内部的空格都会保留。
pub fn lookup_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().any(is_cjk_hangul) {
        trimmed.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn tokenize_is_lossless() {
        let samples = [
            "",
            "Hello, world!",
            "  leading and trailing  ",
            "mixed 日本語とEnglish 한국어\n\tnew-line's end.",
            "emoji 🎉 and numbers 123",
            "café crème brûlée",
        ];
        for sample in samples {
            let joined: String = texts(sample).concat();
            assert_eq!(joined, sample);
        }
    }

    #[test]
    fn tokens_are_never_empty() {
        for token in tokenize("a  b\n\nc—d 漢字") {
            assert!(!token.text.is_empty());
        }
    }

    #[test]
    fn latin_runs_keep_apostrophes_and_hyphens() {
        assert_eq!(texts("don't well-known"), ["don't", " ", "well-known"]);
    }

    #[test]
    fn cjk_and_hangul_are_split_per_character() {
        assert_eq!(texts("学习한국"), ["学", "习", "한", "국"]);
        assert_eq!(texts("カタカナ"), ["カ", "タ", "カ", "ナ"]);
    }

    #[test]
    fn other_characters_are_single_tokens() {
        let tokens = tokenize("42!");
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Other));
    }

    #[test]
    fn whitespace_runs_are_grouped_and_not_clickable() {
        let tokens = tokenize("a \t\n b");
        assert_eq!(tokens[1].text, " \t\n ");
        assert!(!tokens[1].is_clickable());
        assert!(tokens[0].is_clickable());
    }

    #[test]
    fn normalize_case_folds_latin() {
        assert_eq!(normalize("RESILIENT"), "resilient");
        assert_eq!(normalize("café!"), "café");
        assert_eq!(normalize("\"Don't,\""), "don't");
    }

    #[test]
    fn normalize_keeps_cjk_as_is() {
        assert_eq!(normalize("学习。"), "学习");
        assert_eq!(normalize("사랑해요!"), "사랑해요");
        assert_eq!(normalize("ABC漢字"), "ABC漢字");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = ["RESILIENT", "café!", "İstanbul", "ABC漢字", "...", "x-Y'z", "Straße"];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "sample {sample:?}");
        }
    }

    #[test]
    fn normalize_returns_empty_for_punctuation() {
        assert_eq!(normalize("—"), "");
        assert_eq!(normalize("123"), "");
    }

    #[test]
    fn actionable_requires_two_latin_chars_or_cjk() {
        assert!(!is_actionable(""));
        assert!(!is_actionable("a"));
        assert!(is_actionable("an"));
        assert!(is_actionable("가"));
        assert!(is_actionable("字"));
    }

    #[test]
    fn lookup_key_only_trims_and_lowercases() {
        assert_eq!(lookup_key("  Ice Cream "), "ice cream");
        assert_eq!(lookup_key("3.14"), "3.14");
        assert_eq!(lookup_key("123"), "123");
        assert_eq!(lookup_key(" 学习 "), "学习");
        assert_eq!(lookup_key("Seoul 서울"), "Seoul 서울");
        assert_eq!(lookup_key(" \t "), "");
    }
}
