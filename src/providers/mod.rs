//! # AI服务提供商适配器模块
//!
//! 封闭的适配器接口与显式的字符串ID分发注册表

pub mod openai_compat;
pub mod registry;
pub mod traits;
pub mod types;

pub use openai_compat::OpenAiCompatAdapter;
pub use registry::AdapterRegistry;
pub use traits::ProviderAdapter;
pub use types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatStream, DiscoveredModel, ProviderError,
    ProviderResult, StreamChunk, TokenUsage,
};
