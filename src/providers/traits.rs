//! # 适配器特征定义
//!
//! 所有AI服务提供商适配器实现的封闭接口：模型列举与两种补全形态

use async_trait::async_trait;
use entity::provider_credentials;

use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatStream, DiscoveredModel, ProviderResult,
};

/// AI服务提供商适配器特征
///
/// 通过 [`super::registry::AdapterRegistry`] 按提供商字符串ID显式分发
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// 适配器服务的提供商字符串ID
    fn provider_name(&self) -> &str;

    /// 列举该凭证下可用的模型目录（网络IO，可能失败）
    async fn list_models(
        &self,
        credential: &provider_credentials::Model,
    ) -> ProviderResult<Vec<DiscoveredModel>>;

    /// 非流式聊天补全
    async fn chat_completion(
        &self,
        credential: &provider_credentials::Model,
        request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatCompletionResponse>;

    /// 流式聊天补全
    async fn chat_completion_stream(
        &self,
        credential: &provider_credentials::Model,
        request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatStream>;
}
