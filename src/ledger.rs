//! token 用量账本
//!
//! 本机累计的 token 用量与估算费用。费用是派生值，不落盘。
//! 读-加-写不是原子操作，并发记录时可能丢失一次增量，这只是尽力而为的估算。

use crate::error::Result;
use crate::models::TokenUsage;
use crate::storage::KeyValueStore;
use crate::types::PricingConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// 账本在存储中的键
pub const USAGE_KEY: &str = "usage_ledger_v1";

/// 账本快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSnapshot {
    #[serde(flatten)]
    pub usage: TokenUsage,
    pub estimated_cost_usd: f64,
}

/// 用量账本
#[derive(Clone)]
pub struct UsageLedger {
    store: Arc<dyn KeyValueStore>,
    pricing: PricingConfig,
}

impl UsageLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, pricing: PricingConfig) -> Self {
        Self { store, pricing }
    }

    /// 当前累计值；缺失或损坏时为零
    pub fn totals(&self) -> TokenUsage {
        self.store
            .get(USAGE_KEY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(usage) => Some(usage),
                Err(e) => {
                    debug!("Ignoring corrupt usage ledger: {}", e);
                    None
                }
            })
            .unwrap_or_default()
    }

    /// 按字段累加一次调用的用量
    pub fn record(&self, usage: TokenUsage) -> Result<()> {
        let next = self.totals() + usage;
        self.store.set(USAGE_KEY, &serde_json::to_string(&next)?)
    }

    /// 累计值与估算费用
    pub fn read(&self) -> UsageSnapshot {
        let usage = self.totals();
        UsageSnapshot {
            usage,
            estimated_cost_usd: self
                .pricing
                .estimate(usage.prompt_tokens, usage.completion_tokens),
        }
    }

    /// 清零
    pub fn reset(&self) -> Result<()> {
        self.store.remove(USAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn ledger() -> (Arc<MemoryStore>, UsageLedger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = UsageLedger::new(store.clone(), PricingConfig::default());
        (store, ledger)
    }

    #[test]
    fn starts_at_zero() {
        let (_, ledger) = ledger();
        let snapshot = ledger.read();
        assert_eq!(snapshot.usage, TokenUsage::default());
        assert_eq!(snapshot.estimated_cost_usd, 0.0);
    }

    #[test]
    fn records_are_additive_and_cost_is_derived() {
        let (_, ledger) = ledger();
        ledger.record(TokenUsage::new(10, 5, 15)).unwrap();
        ledger.record(TokenUsage::new(3, 2, 5)).unwrap();

        let snapshot = ledger.read();
        assert_eq!(snapshot.usage, TokenUsage::new(13, 7, 20));

        let expected = 13.0 * 0.15 / 1_000_000.0 + 7.0 * 0.60 / 1_000_000.0;
        assert!((snapshot.estimated_cost_usd - expected).abs() < 1e-12);
    }

    #[test]
    fn reported_total_is_trusted() {
        let (_, ledger) = ledger();
        ledger.record(TokenUsage::new(1, 1, 10)).unwrap();
        assert_eq!(ledger.read().usage.total_tokens, 10);
    }

    #[test]
    fn corrupt_state_reads_as_zero() {
        let (store, ledger) = ledger();
        store.set(USAGE_KEY, "{oops").unwrap();
        assert_eq!(ledger.read().usage, TokenUsage::default());

        ledger.record(TokenUsage::new(2, 1, 3)).unwrap();
        assert_eq!(ledger.read().usage, TokenUsage::new(2, 1, 3));
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let (store, ledger) = ledger();
        store.set(USAGE_KEY, r#"{"prompt_tokens": 4}"#).unwrap();
        assert_eq!(ledger.read().usage, TokenUsage::new(4, 0, 0));
    }

    #[test]
    fn reset_zeroes_ledger() {
        let (_, ledger) = ledger();
        ledger.record(TokenUsage::new(10, 5, 15)).unwrap();
        ledger.reset().unwrap();
        assert_eq!(ledger.read().usage, TokenUsage::default());
    }

    #[test]
    fn snapshot_serializes_flat() {
        let (_, ledger) = ledger();
        ledger.record(TokenUsage::new(1, 2, 3)).unwrap();
        let value = serde_json::to_value(ledger.read()).unwrap();
        assert_eq!(value["prompt_tokens"], 1);
        assert_eq!(value["total_tokens"], 3);
        assert!(value["estimated_cost_usd"].is_f64());
    }
}
