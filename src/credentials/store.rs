//! # 凭证存储
//!
//! 读取团队凭证、为调度器枚举活跃凭证、记录同步结果。
//! `last_sync_at`/`last_error` 只通过这里的记录操作写入；
//! 凭证状态（active/error/disabled）由外部管理面维护，本模块不改写。

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::error::{GatewayError, Result};
use crate::{
    ldebug,
    logging::{LogComponent, LogStage},
};
use entity::provider_credentials::status;
use entity::{provider_credentials, provider_types};

/// 凭证与其提供商的联合视图
#[derive(Debug, Clone)]
pub struct CredentialWithProvider {
    pub credential: provider_credentials::Model,
    pub provider: provider_types::Model,
}

/// 凭证存储接口
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 取团队在指定提供商下可用的凭证
    ///
    /// 偏好顺序：默认凭证优先，其次优先级数值最小
    async fn get_credential(
        &self,
        team_id: i32,
        provider_name: &str,
    ) -> Result<Option<provider_credentials::Model>>;

    /// 团队的全部凭证（带提供商）
    async fn get_credentials_by_team(&self, team_id: i32) -> Result<Vec<CredentialWithProvider>>;

    /// 跨团队枚举所有活跃凭证，按 (团队, 优先级, 凭证ID) 稳定排序
    ///
    /// 刷新周期依赖该顺序实现可预测的串行处理
    async fn list_active_credentials(&self) -> Result<Vec<CredentialWithProvider>>;

    /// 记录一次成功同步：写入同步时间并清空错误
    async fn record_sync_success(
        &self,
        credential_id: i32,
        synced_at: NaiveDateTime,
    ) -> Result<()>;

    /// 记录一次失败同步：只写入错误信息，不触碰 `last_sync_at`
    async fn record_sync_error(&self, credential_id: i32, message: &str) -> Result<()>;
}

/// Sea-ORM 实现
pub struct SeaOrmCredentialStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCredentialStore {
    /// 创建凭证存储实例
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn load_active_model(
        &self,
        credential_id: i32,
    ) -> Result<provider_credentials::ActiveModel> {
        let model = provider_credentials::Entity::find_by_id(credential_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                GatewayError::database(format!("凭证不存在: {credential_id}"))
            })?;
        Ok(model.into())
    }
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn get_credential(
        &self,
        team_id: i32,
        provider_name: &str,
    ) -> Result<Option<provider_credentials::Model>> {
        let provider = provider_types::Entity::find()
            .filter(provider_types::Column::Name.eq(provider_name))
            .one(self.db.as_ref())
            .await?;

        let Some(provider) = provider else {
            return Ok(None);
        };

        Ok(provider_credentials::Entity::find()
            .filter(provider_credentials::Column::TeamId.eq(team_id))
            .filter(provider_credentials::Column::ProviderTypeId.eq(provider.id))
            .filter(provider_credentials::Column::Status.eq(status::ACTIVE))
            .order_by_desc(provider_credentials::Column::IsDefault)
            .order_by_asc(provider_credentials::Column::Priority)
            .one(self.db.as_ref())
            .await?)
    }

    async fn get_credentials_by_team(&self, team_id: i32) -> Result<Vec<CredentialWithProvider>> {
        let rows = provider_credentials::Entity::find()
            .filter(provider_credentials::Column::TeamId.eq(team_id))
            .order_by_asc(provider_credentials::Column::Priority)
            .order_by_asc(provider_credentials::Column::Id)
            .find_also_related(provider_types::Entity)
            .all(self.db.as_ref())
            .await?;

        rows.into_iter()
            .map(|(credential, provider)| {
                let provider = provider.ok_or_else(|| {
                    GatewayError::internal(format!(
                        "凭证 {} 引用的提供商不存在",
                        credential.id
                    ))
                })?;
                Ok(CredentialWithProvider {
                    credential,
                    provider,
                })
            })
            .collect()
    }

    async fn list_active_credentials(&self) -> Result<Vec<CredentialWithProvider>> {
        let rows = provider_credentials::Entity::find()
            .filter(provider_credentials::Column::Status.eq(status::ACTIVE))
            .order_by_asc(provider_credentials::Column::TeamId)
            .order_by_asc(provider_credentials::Column::Priority)
            .order_by_asc(provider_credentials::Column::Id)
            .find_also_related(provider_types::Entity)
            .all(self.db.as_ref())
            .await?;

        rows.into_iter()
            .map(|(credential, provider)| {
                let provider = provider.ok_or_else(|| {
                    GatewayError::internal(format!(
                        "凭证 {} 引用的提供商不存在",
                        credential.id
                    ))
                })?;
                Ok(CredentialWithProvider {
                    credential,
                    provider,
                })
            })
            .collect()
    }

    async fn record_sync_success(
        &self,
        credential_id: i32,
        synced_at: NaiveDateTime,
    ) -> Result<()> {
        let mut model = self.load_active_model(credential_id).await?;
        model.last_sync_at = Set(Some(synced_at));
        model.last_error = Set(None);
        model.updated_at = Set(Utc::now().naive_utc());
        model.update(self.db.as_ref()).await?;

        ldebug!(
            "system",
            LogStage::Db,
            LogComponent::CredentialStore,
            "record_sync_success",
            "凭证同步时间已更新",
            credential_id = credential_id
        );
        Ok(())
    }

    async fn record_sync_error(&self, credential_id: i32, message: &str) -> Result<()> {
        let mut model = self.load_active_model(credential_id).await?;
        model.last_error = Set(Some(message.to_string()));
        model.updated_at = Set(Utc::now().naive_utc());
        model.update(self.db.as_ref()).await?;

        ldebug!(
            "system",
            LogStage::Db,
            LogComponent::CredentialStore,
            "record_sync_error",
            "凭证同步错误已记录",
            credential_id = credential_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use crate::testing::helpers::create_test_db;

    #[tokio::test]
    async fn get_credential_prefers_default_then_priority() {
        let db = Arc::new(create_test_db().await.unwrap());
        let store = SeaOrmCredentialStore::new(Arc::clone(&db));
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;

        fixtures::insert_credential(&db, team_id, openai.id, status::ACTIVE, 1, false).await;
        let preferred =
            fixtures::insert_credential(&db, team_id, openai.id, status::ACTIVE, 5, true).await;

        let found = store
            .get_credential(team_id, "openai")
            .await
            .unwrap()
            .expect("credential");
        // is_default 压过更小的 priority
        assert_eq!(found.id, preferred.id);
    }

    #[tokio::test]
    async fn get_credential_skips_non_active() {
        let db = Arc::new(create_test_db().await.unwrap());
        let store = SeaOrmCredentialStore::new(Arc::clone(&db));
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;

        fixtures::insert_credential(&db, team_id, openai.id, status::ERROR, 1, true).await;

        assert!(store.get_credential(team_id, "openai").await.unwrap().is_none());
        assert!(store.get_credential(team_id, "unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_active_credentials_orders_by_team_then_priority() {
        let db = Arc::new(create_test_db().await.unwrap());
        let store = SeaOrmCredentialStore::new(Arc::clone(&db));
        let team_a = fixtures::default_team_id(&db).await;
        let team_b = fixtures::insert_team(&db, "second").await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        let azure = fixtures::provider_by_name(&db, "azure").await;

        fixtures::insert_credential(&db, team_b, openai.id, status::ACTIVE, 1, true).await;
        fixtures::insert_credential(&db, team_a, azure.id, status::ACTIVE, 2, false).await;
        fixtures::insert_credential(&db, team_a, openai.id, status::ACTIVE, 1, true).await;
        fixtures::insert_credential(&db, team_a, openai.id, status::DISABLED, 0, false).await;

        let listed = store.list_active_credentials().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].credential.team_id, team_a);
        assert_eq!(listed[0].credential.priority, 1);
        assert_eq!(listed[1].credential.team_id, team_a);
        assert_eq!(listed[1].credential.priority, 2);
        assert_eq!(listed[2].credential.team_id, team_b);
    }

    #[tokio::test]
    async fn sync_result_bookkeeping() {
        let db = Arc::new(create_test_db().await.unwrap());
        let store = SeaOrmCredentialStore::new(Arc::clone(&db));
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        let credential =
            fixtures::insert_credential(&db, team_id, openai.id, status::ACTIVE, 1, true).await;

        store
            .record_sync_error(credential.id, "connect timeout")
            .await
            .unwrap();
        let reloaded = provider_credentials::Entity::find_by_id(credential.id)
            .one(db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.last_error.as_deref(), Some("connect timeout"));
        // 失败不触碰 last_sync_at
        assert!(reloaded.last_sync_at.is_none());

        let now = Utc::now().naive_utc();
        store.record_sync_success(credential.id, now).await.unwrap();
        let reloaded = provider_credentials::Entity::find_by_id(credential.id)
            .one(db.as_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.last_sync_at, Some(now));
        assert!(reloaded.last_error.is_none());
    }
}
