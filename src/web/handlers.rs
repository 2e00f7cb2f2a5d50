//! API 处理器
//!
//! 查词、段落生成、整段翻译和密钥状态检查。

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ReaderError;
use crate::language::{resolve_language, Language};
use crate::models::{DefinitionResult, ParagraphRequest, ParagraphResult};
use crate::rate_limit::Admission;
use crate::text::lookup_key;
use crate::web::client::ClientKey;
use crate::web::types::{
    AppState, DefineParams, GenerateParams, RateLimitedBody, TranslateBody, TranslateFailure,
};

const DEFAULT_DEFINITION_LANGUAGE: Language = Language::Ko;
const DEFAULT_PARAGRAPH_LANGUAGE: Language = Language::En;
const DEFAULT_TRANSLATION_LANGUAGE: Language = Language::Ko;

/// 错误对应的 HTTP 状态码
pub fn status_for(error: &ReaderError) -> StatusCode {
    match error {
        ReaderError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ReaderError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ReaderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 取开头的整数部分：`"3.5"` 为 3，`"7abc"` 为 7，没有数字时为 `None`
///
/// 超出 `i64` 范围的数字取边界值，之后再由难度范围截断。
fn leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let digits = &rest[..digits_len];
    let parsed = if negative {
        format!("-{}", digits).parse::<i64>().unwrap_or(i64::MIN)
    } else {
        digits.parse::<i64>().unwrap_or(i64::MAX)
    };
    Some(parsed)
}

fn retry_after_header(retry_after_secs: u64) -> (header::HeaderName, HeaderValue) {
    (header::RETRY_AFTER, HeaderValue::from(retry_after_secs))
}

fn rate_limited(client: &ClientKey, retry_after_secs: u64) -> Response {
    warn!(client = client.as_str(), retry_after_secs, "request rejected by rate limiter");
    let error = ReaderError::RateLimited { retry_after_secs };
    (
        StatusCode::TOO_MANY_REQUESTS,
        [retry_after_header(retry_after_secs)],
        Json(RateLimitedBody {
            error: error.to_string(),
            retry_after_seconds: retry_after_secs,
        }),
    )
        .into_response()
}

/// `GET /define?word&lang&fromLang`
pub async fn define(
    State(state): State<Arc<AppState>>,
    client: ClientKey,
    Query(params): Query<DefineParams>,
) -> Response {
    let word = lookup_key(params.word.as_deref().unwrap_or_default());
    if word.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(DefinitionResult::sentinel(""))).into_response();
    }

    let target = resolve_language(params.lang.as_deref(), DEFAULT_DEFINITION_LANGUAGE);
    let source = params
        .from_lang
        .as_deref()
        .and_then(|code| Language::from_code(&code.trim().to_lowercase()));

    if let Admission::Denied { retry_after_secs } = state.limiter.check(client.as_str()) {
        return rate_limited(&client, retry_after_secs);
    }

    let definition = state.services.resolver.resolve(&word, target, source).await;
    Json(definition).into_response()
}

/// `GET /generate?difficulty&profession&style&lang`
///
/// 总是返回 200，失败以回退段落和 `errorMessage` 表示。
pub async fn generate(
    State(state): State<Arc<AppState>>,
    client: ClientKey,
    Query(params): Query<GenerateParams>,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    let difficulty = params
        .difficulty
        .as_deref()
        .and_then(leading_integer)
        .unwrap_or(ParagraphRequest::DEFAULT_DIFFICULTY);
    let request = ParagraphRequest::new(
        difficulty,
        params.profession.as_deref(),
        params.style.as_deref(),
        resolve_language(params.lang.as_deref(), DEFAULT_PARAGRAPH_LANGUAGE),
    );

    let paragraph = match state.limiter.check(client.as_str()) {
        Admission::Allowed => state.services.generator.generate(&request).await,
        Admission::Denied { retry_after_secs } => {
            warn!(client = client.as_str(), retry_after_secs, "paragraph request rate limited");
            let (name, value) = retry_after_header(retry_after_secs);
            headers.insert(name, value);
            ParagraphResult::fallback(Some(
                ReaderError::RateLimited { retry_after_secs }.to_string(),
            ))
        }
    };

    (StatusCode::OK, headers, Json(paragraph)).into_response()
}

/// `POST /translate` `{text, lang}`
pub async fn translate(
    State(state): State<Arc<AppState>>,
    client: ClientKey,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Response {
    if !state.services.translator.is_configured() {
        let error = ReaderError::ServiceUnavailable(format!(
            "{} is not set",
            crate::config::API_KEY_VAR
        ));
        return (status_for(&error), Json(TranslateFailure::new(error.to_string())))
            .into_response();
    }

    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            info!("unreadable translate body: {}", rejection);
            return (StatusCode::BAD_REQUEST, Json(TranslateFailure::new("Missing text")))
                .into_response();
        }
    };

    let text = body.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(TranslateFailure::new("Missing text")))
            .into_response();
    }
    let target = resolve_language(body.lang.as_deref(), DEFAULT_TRANSLATION_LANGUAGE);

    if let Admission::Denied { retry_after_secs } = state.limiter.check(client.as_str()) {
        return rate_limited(&client, retry_after_secs);
    }

    match state.services.translator.translate(text, target).await {
        Ok(translation) => Json(translation).into_response(),
        Err(error) => {
            (status_for(&error), Json(TranslateFailure::new(error.to_string()))).into_response()
        }
    }
}

/// `GET /env-check`，不暴露密钥本身
pub async fn env_check(State(state): State<Arc<AppState>>) -> Response {
    Json(state.credentials.clone()).into_response()
}
