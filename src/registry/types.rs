//! # 模型注册表类型定义

use serde::{Deserialize, Serialize};

/// 模型 upsert 输入
///
/// `None` 字段在更新时保留数据库现值（COALESCE 语义）
#[derive(Debug, Clone, Default)]
pub struct ModelUpsert {
    pub provider_model_id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub context_length: Option<i32>,
}

impl ModelUpsert {
    /// 仅携带提供商原生模型ID的 upsert 输入
    #[must_use]
    pub fn new(provider_model_id: impl Into<String>) -> Self {
        Self {
            provider_model_id: provider_model_id.into(),
            ..Self::default()
        }
    }
}

/// 标识符解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    /// 模型行ID
    pub model_id: i32,
    /// 提供商类型ID
    pub provider_type_id: i32,
    /// 提供商字符串ID，如 `openai`
    pub provider_name: String,
    /// 提供商原生模型ID
    pub provider_model_id: String,
    /// 统一标识
    pub unified_id: String,
}

/// 多提供商视图中的单个提供商条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderEntry {
    pub provider_name: String,
    pub provider_model_id: String,
    pub unified_id: String,
    pub context_length: Option<i32>,
    /// 所属凭证状态
    pub credential_status: String,
    /// 所属凭证优先级，数值越小越优先
    pub priority: i32,
}

/// 按规范名聚合的多提供商模型视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiProviderModel {
    pub canonical_name: String,
    /// 按优先级升序排列
    pub providers: Vec<ProviderEntry>,
    pub aliases: Vec<String>,
}

/// 模型列表条目，喂给「list models」读端点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelListEntry {
    /// 统一ID（模型条目）或别名字符串（别名条目）
    pub id: String,
    /// 别名条目指向所属模型的统一ID，模型条目为空
    pub parent: Option<String>,
    /// 与 `parent` 一致，供多层别名扩展保留
    pub root: Option<String>,
    pub display_name: Option<String>,
    pub context_length: Option<i32>,
}
