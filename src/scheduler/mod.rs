//! # 模型刷新调度器模块
//!
//! 后台维持模型目录与凭证健康：TTL驱动的到期判定、串行刷新周期、
//! 按凭证的有界指数退避

pub mod backoff;
pub mod refresh;
pub mod task;
pub mod types;

pub use backoff::{BackoffTracker, ProviderRefreshState, backoff_delay};
pub use refresh::ModelRefreshService;
pub use task::ModelRefreshTask;
pub use types::{CredentialRefreshOutcome, CycleStats, RefreshConfig, TaskState};
