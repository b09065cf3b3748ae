//! # 日志配置模块
//!
//! 提供统一的结构化日志宏与订阅器初始化，日志条目携带阶段与组件标签

use std::env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 日志阶段标签，标记一条日志产生于哪个处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStage {
    /// 进程启动
    Startup,
    /// 进程关闭
    Shutdown,
    /// 数据库访问
    Db,
    /// 缓存/计数器存储访问
    Cache,
    /// 请求路由解析
    Routing,
    /// 速率限制检查
    RateLimit,
    /// 配额检查与消耗
    Quota,
    /// 模型目录刷新
    Refresh,
    /// 其他内部处理
    Internal,
}

impl LogStage {
    /// 转换为日志字段值
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Db => "db",
            Self::Cache => "cache",
            Self::Routing => "routing",
            Self::RateLimit => "rate_limit",
            Self::Quota => "quota",
            Self::Refresh => "refresh",
            Self::Internal => "internal",
        }
    }
}

/// 日志组件标签，标记一条日志由哪个组件产生
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    /// 主程序
    Main,
    /// 数据库模块
    Database,
    /// 缓存客户端
    Cache,
    /// 模型注册表
    Registry,
    /// 路由解析器
    Resolver,
    /// 速率限制器
    RateLimiter,
    /// 配额服务
    Quota,
    /// 刷新调度器
    RefreshScheduler,
    /// 凭证存储
    CredentialStore,
    /// 提供商适配器
    Adapter,
}

impl LogComponent {
    /// 转换为日志字段值
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Registry => "registry",
            Self::Resolver => "resolver",
            Self::RateLimiter => "rate_limiter",
            Self::Quota => "quota",
            Self::RefreshScheduler => "refresh_scheduler",
            Self::CredentialStore => "credential_store",
            Self::Adapter => "adapter",
        }
    }
}

/// 结构化 debug 日志
#[macro_export]
macro_rules! ldebug {
    ($request_id:expr, $stage:expr, $component:expr, $event:expr, $message:expr $(, $($fields:tt)+)?) => {
        tracing::debug!(
            request_id = $request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            event = $event,
            $($($fields)+,)?
            "{}", $message
        )
    };
}

/// 结构化 info 日志
#[macro_export]
macro_rules! linfo {
    ($request_id:expr, $stage:expr, $component:expr, $event:expr, $message:expr $(, $($fields:tt)+)?) => {
        tracing::info!(
            request_id = $request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            event = $event,
            $($($fields)+,)?
            "{}", $message
        )
    };
}

/// 结构化 warn 日志
#[macro_export]
macro_rules! lwarn {
    ($request_id:expr, $stage:expr, $component:expr, $event:expr, $message:expr $(, $($fields:tt)+)?) => {
        tracing::warn!(
            request_id = $request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            event = $event,
            $($($fields)+,)?
            "{}", $message
        )
    };
}

/// 结构化 error 日志
#[macro_export]
macro_rules! lerror {
    ($request_id:expr, $stage:expr, $component:expr, $event:expr, $message:expr $(, $($fields:tt)+)?) => {
        tracing::error!(
            request_id = $request_id,
            stage = $stage.as_str(),
            component = $component.as_str(),
            event = $event,
            $($($fields)+,)?
            "{}", $message
        )
    };
}

/// 初始化日志系统
///
/// 默认屏蔽 SQLx 查询日志，生产环境性能优先；通过 `RUST_LOG` 覆盖
pub fn init_logging(log_level: Option<&String>) {
    let level = log_level.map_or("info", std::string::String::as_str);

    let default_filter = format!("{level},llm_gateway=debug,sqlx::query=off,sea_orm::query=warn,sqlx=warn");

    let log_filter = env::var("RUST_LOG").unwrap_or(default_filter);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_and_component_labels() {
        assert_eq!(LogStage::Refresh.as_str(), "refresh");
        assert_eq!(LogStage::RateLimit.as_str(), "rate_limit");
        assert_eq!(LogComponent::RefreshScheduler.as_str(), "refresh_scheduler");
        assert_eq!(LogComponent::Registry.as_str(), "registry");
    }
}
