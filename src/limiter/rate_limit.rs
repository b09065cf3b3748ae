//! # 分布式速率限制器
//!
//! 基于计数器存储的 `INCR` + 首请求 `EXPIRE` 实现跨实例一致的每分钟请求限制。
//! 存储不可用时拒绝请求（fail-closed）：基础设施故障不能成为绕过限流的通道。

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheKey, CounterStore};
use crate::{
    ldebug, lwarn,
    logging::{LogComponent, LogStage},
};

use super::types::{RateLimitConfig, RateLimitOutcome};

/// 速率限制器（按API密钥维度）
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// 创建限流器实例
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// 检查并计入一次请求
    ///
    /// `limit` 为空时使用配置的默认RPM。窗口从该密钥在本窗口的
    /// 第一个请求开始计时（滚动TTL窗口），上报的重置时间由同一个
    /// TTL推导，保证与执行计数一致。
    pub async fn check(&self, api_key_id: &str, limit: Option<i64>) -> RateLimitOutcome {
        let limit = limit.unwrap_or(self.config.default_rpm);
        let key = CacheKey::RateLimit {
            api_key_id: api_key_id.to_string(),
        }
        .build();
        let window = Duration::from_secs(self.config.window_seconds);

        let count = match self.store.incr(&key, 1).await {
            Ok(count) => count,
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::RateLimit,
                    LogComponent::RateLimiter,
                    "store_unavailable",
                    "计数器存储不可用，速率限制按拒绝处理",
                    api_key_id = api_key_id,
                    error = %e
                );
                return self.fail_closed();
            }
        };

        // 窗口内第一个请求时设置过期，形成滚动计数窗口
        if count == 1 {
            let _ = self.store.expire(&key, window).await;
        }

        let residual_seconds = match self.store.ttl(&key).await {
            Ok(ttl) if ttl > 0 => ttl.unsigned_abs(),
            // TTL 缺失或读取失败时退回名义窗口长度
            _ => self.config.window_seconds,
        };

        let allowed = count <= limit;
        #[allow(clippy::cast_possible_wrap)]
        let reset_at = Utc::now() + chrono::Duration::seconds(residual_seconds as i64);

        ldebug!(
            "system",
            LogStage::RateLimit,
            LogComponent::RateLimiter,
            "check",
            &format!("速率检查: key={api_key_id}, count={count}, limit={limit}, allowed={allowed}")
        );

        RateLimitOutcome {
            allowed,
            remaining: (limit - count).max(0),
            reset_at,
            retry_after: if allowed { None } else { Some(residual_seconds) },
        }
    }

    /// fail-closed 结果：按名义窗口告知重试时间
    fn fail_closed(&self) -> RateLimitOutcome {
        #[allow(clippy::cast_possible_wrap)]
        let reset_at = Utc::now() + chrono::Duration::seconds(self.config.window_seconds as i64);
        RateLimitOutcome {
            allowed: false,
            remaining: 0,
            reset_at,
            retry_after: Some(self.config.window_seconds),
        }
    }
}
