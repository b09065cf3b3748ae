//! # 路由解析类型定义

use axum::http::StatusCode;
use std::sync::Arc;

use crate::providers::ProviderAdapter;
use entity::provider_credentials;

/// 路由解析失败代码
///
/// 解析要么完整成功，要么返回恰好一个代码；基础设施故障走通用错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionErrorCode {
    /// 标识符既不是别名也不是统一ID
    ModelNotFound,
    /// 提供商没有注册适配器
    NoAdapter,
    /// 团队没有该提供商的可用凭证
    NoCredentials,
}

impl ResolutionErrorCode {
    /// 对外错误代码
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModelNotFound => "model_not_found",
            Self::NoAdapter => "no_adapter",
            Self::NoCredentials => "no_credentials",
        }
    }

    /// 对应的HTTP状态码
    #[must_use]
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::ModelNotFound => StatusCode::NOT_FOUND,
            Self::NoCredentials => StatusCode::UNAUTHORIZED,
            Self::NoAdapter => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 响应体中的错误代码字段
    #[must_use]
    pub const fn response_code(self) -> &'static str {
        match self {
            Self::ModelNotFound => "MODEL_NOT_FOUND",
            Self::NoAdapter => "NO_ADAPTER",
            Self::NoCredentials => "NO_CREDENTIALS",
        }
    }
}

impl std::fmt::Display for ResolutionErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 完整的路由目标
///
/// 请求处理层据此分发到具体适配器；响应中的 `model` 字段
/// 一律改写为这里的 `unified_id`
#[derive(Clone)]
pub struct RoutingTarget {
    /// 提供商字符串ID
    pub provider_name: String,
    /// 提供商原生模型ID，适配器调用时使用
    pub provider_model_id: String,
    /// 统一标识
    pub unified_id: String,
    /// 解密后的团队凭证
    pub credential: provider_credentials::Model,
    /// 提供商适配器句柄
    pub adapter: Arc<dyn ProviderAdapter>,
}

impl std::fmt::Debug for RoutingTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingTarget")
            .field("provider_name", &self.provider_name)
            .field("provider_model_id", &self.provider_model_id)
            .field("unified_id", &self.unified_id)
            .field("credential_id", &self.credential.id)
            .finish_non_exhaustive()
    }
}
