//! 速率限制器
//!
//! 按客户端键做滑动窗口准入控制，保护会调用计费服务的接口。
//! 过滤、检查、记录在同一把锁内完成，中间没有任何 await 点。

use crate::error::ReaderError;
use crate::types::RateLimitConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

/// 定期清理的最短间隔
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

/// 一次准入检查的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Denied {
        /// 最早一条记录滑出窗口还需等待的秒数（向上取整，至少为 1）
        retry_after_secs: u64,
    },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }

    /// 转为错误，便于在 `?` 链中使用
    pub fn into_result(self) -> Result<(), ReaderError> {
        match self {
            Admission::Allowed => Ok(()),
            Admission::Denied { retry_after_secs } => {
                Err(ReaderError::RateLimited { retry_after_secs })
            }
        }
    }
}

/// 滑动窗口速率限制器
///
/// 每个客户端键保存窗口内的请求时间戳；窗口内已有 `max_requests` 条记录时拒绝。
/// 空闲键由 [`sweep`](Self::sweep) 清理：既可以由 [`spawn_sweeper`](Self::spawn_sweeper)
/// 定时触发，也会在跟踪的键数超过阈值时在检查过程中立即触发。
///
/// # 示例
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use word_reader::{Admission, SlidingWindowLimiter};
///
/// let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
/// let start = Instant::now();
///
/// assert!(limiter.check_at("10.0.0.1", start).is_allowed());
/// assert!(limiter.check_at("10.0.0.1", start).is_allowed());
/// assert_eq!(
///     limiter.check_at("10.0.0.1", start + Duration::from_secs(15)),
///     Admission::Denied { retry_after_secs: 45 }
/// );
/// assert!(limiter.check_at("10.0.0.1", start + Duration::from_secs(61)).is_allowed());
/// ```
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
    sweep_threshold: usize,
}

impl SlidingWindowLimiter {
    /// 创建新的速率限制器
    ///
    /// # 参数
    ///
    /// * `max_requests` - 窗口内每个键允许的最大请求数
    /// * `window` - 滑动窗口长度
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: max_requests.max(1),
            window,
            sweep_threshold: RateLimitConfig::default().sweep_threshold,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
            .with_sweep_threshold(config.sweep_threshold)
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold.max(1);
        self
    }

    /// 以当前时间检查并记录一次请求
    pub fn check(&self, key: &str) -> Admission {
        self.check_at(key, Instant::now())
    }

    /// 以给定时间检查并记录一次请求
    pub fn check_at(&self, key: &str, now: Instant) -> Admission {
        let mut windows = self.lock();

        if windows.len() > self.sweep_threshold && !windows.contains_key(key) {
            let removed = Self::sweep_locked(&mut windows, now, self.window);
            debug!(removed, "rate limiter size threshold sweep");
        }

        let timestamps = windows.entry(key.to_string()).or_default();
        while let Some(&oldest) = timestamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            let oldest = timestamps.front().copied().unwrap_or(now);
            let remaining = (oldest + self.window).saturating_duration_since(now);
            let retry_after_secs = ceil_secs(remaining).max(1);
            debug!(key, retry_after_secs, "rate limit exceeded");
            return Admission::Denied { retry_after_secs };
        }

        timestamps.push_back(now);
        Admission::Allowed
    }

    /// 删除所有时间戳都已过期的键，返回删除的数量
    pub fn sweep(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        Self::sweep_locked(&mut windows, now, self.window)
    }

    fn sweep_locked(
        windows: &mut HashMap<String, VecDeque<Instant>>,
        now: Instant,
        window: Duration,
    ) -> usize {
        let before = windows.len();
        windows.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|&latest| now.saturating_duration_since(latest) < window)
        });
        before - windows.len()
    }

    /// 当前跟踪的键数量
    pub fn tracked_keys(&self) -> usize {
        self.lock().len()
    }

    /// 启动定期清理任务
    ///
    /// 间隔小于 [`MIN_SWEEP_INTERVAL`] 时（包括配置为 0）按最小间隔运行。
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = limiter.sweep(Instant::now());
                if removed > 0 {
                    debug!(removed, "rate limiter periodic sweep");
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Instant>>> {
        // A poisoned map only ever holds timestamps, so keep using it.
        self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
