//! # 适配器通用类型定义

use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;

/// 适配器错误类型
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Invalid request format: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Provider API error: {status_code} - {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Response parse error: {0}")]
    ResponseParseError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_status() {
            Self::ApiError {
                status_code: err.status().map_or(0, |s| s.as_u16()),
                message: err.to_string(),
            }
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}

impl From<ProviderError> for crate::error::GatewayError {
    fn from(err: ProviderError) -> Self {
        Self::ai_provider_with_source("适配器调用失败", "provider", anyhow::Error::new(err))
    }
}

/// 适配器从上游发现的模型条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveredModel {
    /// 提供商原生模型ID
    pub native_id: String,
    pub display_name: Option<String>,
    pub context_length: Option<i32>,
}

impl DiscoveredModel {
    /// 仅携带原生ID的条目
    #[must_use]
    pub fn new(native_id: impl Into<String>) -> Self {
        Self {
            native_id: native_id.into(),
            display_name: None,
            context_length: None,
        }
    }
}

/// 聊天补全请求（OpenAI 兼容的最小表示）
///
/// 提供商专有的字段转换发生在各适配器内部，这里不做格式裁决
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// 提供商原生模型ID（解析后的，不是调用方标识符）
    pub model: String,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub stream: bool,
}

/// 用量统计
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

/// 聊天补全响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// 上游返回的原始响应体
    pub body: Value,
    pub usage: TokenUsage,
}

/// 流式响应块（SSE 透传）
#[derive(Debug, Clone)]
pub struct StreamChunk {
    pub data: bytes::Bytes,
}

/// 聊天补全流
pub type ChatStream = Pin<Box<dyn Stream<Item = ProviderResult<StreamChunk>> + Send>>;
