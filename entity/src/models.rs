//! # 模型目录实体定义
//!
//! 模型注册表：每个 (提供商, 提供商原生模型ID) 一行

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 模型目录实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub provider_type_id: i32,
    pub provider_model_id: String,
    /// 对外统一标识，形如 `openai:gpt-4`，全局唯一
    #[sea_orm(unique)]
    pub unified_id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub context_length: Option<i32>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::provider_types::Entity",
        from = "Column::ProviderTypeId",
        to = "super::provider_types::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ProviderType,
    #[sea_orm(has_many = "super::model_aliases::Entity")]
    ModelAliases,
}

impl Related<super::provider_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProviderType.def()
    }
}

impl Related<super::model_aliases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelAliases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
