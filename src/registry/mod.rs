//! # 模型注册表模块
//!
//! 模型目录的持久化存储与查询：统一ID、规范名分组、别名与最优提供商选择

pub mod canonical;
pub mod service;
pub mod types;

pub use canonical::{canonical_model_name, parse_unified_id, unified_model_id};
pub use service::ModelRegistry;
pub use types::{ModelListEntry, ModelUpsert, MultiProviderModel, ProviderEntry, ResolvedModel};
