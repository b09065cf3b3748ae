//! # 限流与配额类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 速率限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// 默认每窗口请求数上限
    pub default_rpm: i64,
    /// 窗口长度（秒）
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default_rpm: 60,
            window_seconds: 60,
        }
    }
}

/// 速率限制检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    /// 窗口内剩余额度，拒绝时为 0
    pub remaining: i64,
    /// 当前窗口的重置时间，与执行计数共用同一TTL推导
    pub reset_at: DateTime<Utc>,
    /// 拒绝时的建议重试等待秒数
    pub retry_after: Option<u64>,
}

/// 配额检查结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaOutcome {
    pub allowed: bool,
    /// 剩余token预算；无限配额时为 `None`
    pub remaining: Option<i64>,
    /// 当前累计用量
    pub used: i64,
    /// 配额上限；无限配额时为 `None`
    pub limit: Option<i64>,
}
