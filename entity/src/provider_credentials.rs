//! # 提供商凭证实体定义
//!
//! 团队在某个提供商下的访问凭证表，含健康状态与同步簿记

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 凭证状态常量，存储为字符串列
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const ERROR: &str = "error";
    pub const DISABLED: &str = "disabled";
}

/// 提供商凭证实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "provider_credentials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub team_id: i32,
    pub provider_type_id: i32,
    pub api_key: String,
    pub name: String,
    pub status: String,
    pub is_default: bool,
    pub priority: i32,
    pub last_sync_at: Option<DateTime>,
    pub last_error: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    /// 凭证是否可用于路由
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.status == status::ACTIVE
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::provider_types::Entity",
        from = "Column::ProviderTypeId",
        to = "super::provider_types::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    ProviderType,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::provider_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProviderType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
