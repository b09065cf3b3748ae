//! # 团队实体定义
//!
//! 团队表的 Sea-ORM 实体模型，凭证与别名的归属范围

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 团队实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::provider_credentials::Entity")]
    ProviderCredentials,
    #[sea_orm(has_many = "super::model_aliases::Entity")]
    ModelAliases,
}

impl Related<super::provider_credentials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProviderCredentials.def()
    }
}

impl Related<super::model_aliases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelAliases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
