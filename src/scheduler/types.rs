//! # 刷新调度器类型定义

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 模型目录刷新配置
///
/// 所有参数在构造时确定；`provider_ttl_overrides` 按提供商字符串ID覆盖默认TTL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// 默认目录TTL（秒），超过即视为需要刷新
    pub default_ttl_seconds: u64,
    /// 按提供商的TTL覆盖
    pub provider_ttl_overrides: HashMap<String, u64>,
    /// 首次失败后的退避延迟（秒）
    pub initial_backoff_seconds: u64,
    /// 退避延迟上限（秒）
    pub max_backoff_seconds: u64,
    /// 退避倍数
    pub backoff_multiplier: f64,
    /// 最大重试次数，达到后该凭证进入 exhausted 状态
    pub max_retries: u32,
    /// 调度循环间隔（秒）
    pub tick_interval_seconds: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 3600,
            provider_ttl_overrides: HashMap::new(),
            initial_backoff_seconds: 60,
            max_backoff_seconds: 3600,
            backoff_multiplier: 2.0,
            max_retries: 5,
            tick_interval_seconds: 300,
        }
    }
}

impl RefreshConfig {
    /// 提供商的有效TTL：覆盖值或默认值
    #[must_use]
    pub fn ttl_for_provider(&self, provider_name: &str) -> u64 {
        self.provider_ttl_overrides
            .get(provider_name)
            .copied()
            .unwrap_or(self.default_ttl_seconds)
    }
}

/// 后台任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// 未启动
    NotStarted,
    /// 运行中
    Running,
    /// 停止中
    Stopping,
    /// 已停止
    Stopped,
}

/// 任务控制信号
#[derive(Debug, Clone, Copy)]
pub enum TaskControl {
    /// 停止任务
    Stop,
    /// 立即执行一次刷新周期
    ExecuteNow,
}

/// 单个凭证的刷新结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialRefreshOutcome {
    /// 成功，携带 upsert 的模型数量
    Refreshed(usize),
    /// 失败，携带错误信息
    Failed(String),
    /// 处于退避窗口内被跳过
    SkippedBackoff,
    /// 重试耗尽被跳过
    SkippedExhausted,
}

/// 单个刷新周期的统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleStats {
    /// 本周期是否真正执行（已有周期进行中时为 false）
    pub ran: bool,
    /// 到期待刷新的凭证数
    pub due: usize,
    /// 成功刷新数
    pub refreshed: usize,
    /// 失败数
    pub failed: usize,
    /// 因退避/耗尽被跳过数
    pub skipped: usize,
    /// 周期是否被 stop() 中途打断
    pub cancelled: bool,
}
