//! # 模型别名实体定义
//!
//! 指向单个模型的短名，团队范围或全局范围（`team_id` 为空）

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 模型别名实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "model_aliases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub model_id: i32,
    pub alias: String,
    /// 为空表示全局别名，对所有团队可见
    pub team_id: Option<i32>,
    pub created_at: DateTime,
}

impl Model {
    /// 是否为全局别名
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.team_id.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::models::Entity",
        from = "Column::ModelId",
        to = "super::models::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ModelEntry,
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModelEntry.def()
    }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
