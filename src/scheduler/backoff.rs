//! # 按凭证的刷新退避状态
//!
//! 仅存在于内存中：进程重启即清空，TTL驱动的 `needs_refresh`
//! 会让所有凭证立即重新尝试，因此无需持久化。

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use std::time::Duration;

use super::types::RefreshConfig;

/// 凭证刷新重试状态
#[derive(Debug, Clone, Default)]
pub struct ProviderRefreshState {
    /// 连续失败次数
    pub retry_count: u32,
    /// 最近一次尝试时间
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// 下一次允许重试的时间；耗尽后为空
    pub next_retry_at: Option<DateTime<Utc>>,
    /// 最近一次错误
    pub last_error: Option<String>,
}

/// 计算第 `retry_count` 次重试的退避延迟
///
/// `delay = min(initial * multiplier^retry_count, max)`
#[must_use]
pub fn backoff_delay(config: &RefreshConfig, retry_count: u32) -> Duration {
    #[allow(clippy::cast_precision_loss)]
    let raw = config.initial_backoff_seconds as f64
        * config
            .backoff_multiplier
            .powi(i32::try_from(retry_count).unwrap_or(i32::MAX));
    #[allow(clippy::cast_precision_loss)]
    let capped = raw.min(config.max_backoff_seconds as f64);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let seconds = capped as u64;
    Duration::from_secs(seconds)
}

/// 退避状态跟踪器，调度器独占持有
///
/// 解析器与限流器从不读取这里的状态
pub struct BackoffTracker {
    states: DashMap<i32, ProviderRefreshState>,
    config: RefreshConfig,
}

impl BackoffTracker {
    /// 创建跟踪器
    #[must_use]
    pub fn new(config: RefreshConfig) -> Self {
        Self {
            states: DashMap::new(),
            config,
        }
    }

    /// 记录一次失败，返回更新后的状态
    ///
    /// `retry_count` 自增；未达上限时按公式排定 `next_retry_at`，
    /// 达到上限后不再排定（exhausted）
    pub fn record_failure(&self, credential_id: i32, error: &str) -> ProviderRefreshState {
        let now = Utc::now();
        let mut entry = self.states.entry(credential_id).or_default();

        entry.retry_count += 1;
        entry.last_attempt_at = Some(now);
        entry.last_error = Some(error.to_string());

        if entry.retry_count < self.config.max_retries {
            let delay = backoff_delay(&self.config, entry.retry_count);
            #[allow(clippy::cast_possible_wrap)]
            let delay = ChronoDuration::seconds(delay.as_secs() as i64);
            entry.next_retry_at = Some(now + delay);
        } else {
            entry.next_retry_at = None;
        }

        entry.clone()
    }

    /// 记录一次成功：清空该凭证的全部退避历史
    pub fn record_success(&self, credential_id: i32) {
        self.states.remove(&credential_id);
    }

    /// 是否处于退避窗口内（存在未来的 `next_retry_at`）
    #[must_use]
    pub fn is_in_backoff(&self, credential_id: i32) -> bool {
        self.states
            .get(&credential_id)
            .and_then(|state| state.next_retry_at)
            .is_some_and(|at| at > Utc::now())
    }

    /// 重试是否已耗尽
    #[must_use]
    pub fn is_exhausted(&self, credential_id: i32) -> bool {
        self.states
            .get(&credential_id)
            .is_some_and(|state| state.retry_count >= self.config.max_retries)
    }

    /// 手动重置：清空状态以强制立即尝试
    pub fn reset(&self, credential_id: i32) {
        self.states.remove(&credential_id);
    }

    /// 读取当前状态快照
    #[must_use]
    pub fn state(&self, credential_id: i32) -> Option<ProviderRefreshState> {
        self.states.get(&credential_id).map(|s| s.clone())
    }
}
