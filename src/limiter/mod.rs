//! # 限流与配额模块
//!
//! 请求路径上的两道闸门：按API密钥的速率限制、按项目的token配额。
//! 两者共享同一失败设计：计数器存储不可用时一律拒绝（fail-closed）。

pub mod quota;
pub mod rate_limit;
pub mod types;

pub use quota::QuotaService;
pub use rate_limit::RateLimiter;
pub use types::{QuotaOutcome, RateLimitConfig, RateLimitOutcome};
