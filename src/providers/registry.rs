//! # 适配器注册表
//!
//! 按提供商字符串ID显式分发适配器的映射表，进程启动时构建一次

use std::collections::HashMap;
use std::sync::Arc;

use entity::provider_types;

use super::openai_compat::OpenAiCompatAdapter;
use super::traits::ProviderAdapter;

/// 提供商适配器注册表
///
/// 显式注册、按名查找；没有运行时形状探测，也没有全局单例
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
    /// 创建空注册表
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个适配器，同名覆盖
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters
            .insert(adapter.provider_name().to_string(), adapter);
    }

    /// 按提供商字符串ID查找适配器
    #[must_use]
    pub fn get(&self, provider_name: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(provider_name).cloned()
    }

    /// 是否存在指定提供商的适配器
    #[must_use]
    pub fn contains(&self, provider_name: &str) -> bool {
        self.adapters.contains_key(provider_name)
    }

    /// 已注册的提供商ID列表
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    /// 从数据库中的提供商表构建注册表
    ///
    /// 目前为 `api_format == "openai"` 的提供商挂载 OpenAI 兼容适配器；
    /// 其他格式留空，解析时表现为 `no_adapter`
    #[must_use]
    pub fn from_providers(providers: &[provider_types::Model]) -> Self {
        let mut registry = Self::new();
        for provider in providers {
            if !provider.is_active {
                continue;
            }
            if provider.api_format == "openai" {
                registry.register(Arc::new(OpenAiCompatAdapter::new(
                    &provider.name,
                    &format!("https://{}", provider.base_url),
                )));
            }
        }
        registry
    }
}
