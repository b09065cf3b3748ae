//! # 测试数据 Fixtures
//!
//! 提供团队、提供商、凭证与模型的预设数据

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use entity::{model_aliases, models, provider_credentials, provider_types, teams};

/// 迁移种子中默认团队的ID
pub async fn default_team_id(db: &DatabaseConnection) -> i32 {
    teams::Entity::find()
        .filter(teams::Column::Name.eq("default"))
        .one(db)
        .await
        .expect("query default team")
        .expect("default team seeded by migration")
        .id
}

/// 插入一个团队，返回其ID
pub async fn insert_team(db: &DatabaseConnection, name: &str) -> i32 {
    let now = Utc::now().naive_utc();
    teams::ActiveModel {
        name: Set(name.to_string()),
        display_name: Set(format!("{name} team")),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert team")
    .id
}

/// 取迁移种子中的提供商（openai/anthropic/azure）
pub async fn provider_by_name(db: &DatabaseConnection, name: &str) -> provider_types::Model {
    provider_types::Entity::find()
        .filter(provider_types::Column::Name.eq(name))
        .one(db)
        .await
        .expect("query provider")
        .unwrap_or_else(|| panic!("provider {name} seeded by migration"))
}

/// 插入一条提供商凭证
pub async fn insert_credential(
    db: &DatabaseConnection,
    team_id: i32,
    provider_type_id: i32,
    status: &str,
    priority: i32,
    is_default: bool,
) -> provider_credentials::Model {
    let now = Utc::now().naive_utc();
    provider_credentials::ActiveModel {
        team_id: Set(team_id),
        provider_type_id: Set(provider_type_id),
        api_key: Set("sk-test-key".to_string()),
        name: Set(format!("cred-p{provider_type_id}-{priority}")),
        status: Set(status.to_string()),
        is_default: Set(is_default),
        priority: Set(priority),
        last_sync_at: Set(None),
        last_error: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert credential")
}

/// 直接插入一条模型记录（绕过注册表）
pub async fn insert_model(
    db: &DatabaseConnection,
    provider: &provider_types::Model,
    provider_model_id: &str,
) -> models::Model {
    let now = Utc::now().naive_utc();
    models::ActiveModel {
        provider_type_id: Set(provider.id),
        provider_model_id: Set(provider_model_id.to_string()),
        unified_id: Set(format!("{}:{provider_model_id}", provider.name)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert model")
}

/// 直接插入一条别名记录（绕过注册表）
pub async fn insert_alias(
    db: &DatabaseConnection,
    model_id: i32,
    alias: &str,
    team_id: Option<i32>,
) -> model_aliases::Model {
    model_aliases::ActiveModel {
        model_id: Set(model_id),
        alias: Set(alias.to_string()),
        team_id: Set(team_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert alias")
}
