//! # 测试 Mock 对象
//!
//! 提供适配器与计数器存储的可控实现用于单元测试

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::CounterStore;
use crate::error::{GatewayError, Result};
use crate::providers::{
    ChatCompletionRequest, ChatCompletionResponse, ChatStream, DiscoveredModel, ProviderAdapter,
    ProviderError, ProviderResult, TokenUsage,
};
use entity::provider_credentials;

/// 可控的 Mock 适配器
///
/// `set_fail` 切换失败模式；`list_calls` 记录上游被打了几次
pub struct MockAdapter {
    provider_name: String,
    models: Vec<DiscoveredModel>,
    fail: AtomicBool,
    list_calls: AtomicUsize,
}

impl MockAdapter {
    /// 返回固定模型列表的适配器
    #[must_use]
    pub fn new(provider_name: &str, models: Vec<DiscoveredModel>) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            models,
            fail: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// 初始即处于失败模式的适配器
    #[must_use]
    pub fn failing(provider_name: &str) -> Self {
        let adapter = Self::new(provider_name, vec![DiscoveredModel::new("mock-model")]);
        adapter.fail.store(true, Ordering::SeqCst);
        adapter
    }

    /// 切换失败模式
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// `list_models` 被调用的次数
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    async fn list_models(
        &self,
        _credential: &provider_credentials::Model,
    ) -> ProviderResult<Vec<DiscoveredModel>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::NetworkError("mock upstream down".to_string()));
        }
        Ok(self.models.clone())
    }

    async fn chat_completion(
        &self,
        _credential: &provider_credentials::Model,
        _request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatCompletionResponse> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::NetworkError("mock upstream down".to_string()));
        }
        Ok(ChatCompletionResponse {
            body: serde_json::json!({"choices": []}),
            usage: TokenUsage::default(),
        })
    }

    async fn chat_completion_stream(
        &self,
        _credential: &provider_credentials::Model,
        _request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatStream> {
        Ok(Box::pin(futures::stream::empty()))
    }
}

/// 永远失败的计数器存储，模拟 Redis 不可用
pub struct FailingCounterStore;

#[async_trait]
impl CounterStore for FailingCounterStore {
    async fn incr(&self, _key: &str, _delta: i64) -> Result<i64> {
        Err(GatewayError::cache("counter store unavailable"))
    }

    async fn get(&self, _key: &str) -> Result<Option<i64>> {
        Err(GatewayError::cache("counter store unavailable"))
    }

    async fn ttl(&self, _key: &str) -> Result<i64> {
        Err(GatewayError::cache("counter store unavailable"))
    }

    async fn expire(&self, _key: &str, _ttl: Duration) -> Result<bool> {
        Err(GatewayError::cache("counter store unavailable"))
    }

    async fn ping(&self) -> Result<()> {
        Err(GatewayError::cache("counter store unavailable"))
    }
}
