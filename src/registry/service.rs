//! # 模型注册表服务
//!
//! 模型与别名的持久化操作：upsert、标识符解析、规范名分组与最优提供商选择

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{GatewayError, Result};
use crate::{
    ldebug,
    logging::{LogComponent, LogStage},
};
use entity::provider_credentials::status as credential_status;
use entity::{model_aliases, models, provider_credentials, provider_types};

use super::canonical::{canonical_model_name, unified_model_id};
use super::types::{ModelListEntry, ModelUpsert, MultiProviderModel, ProviderEntry, ResolvedModel};

/// 模型注册表
///
/// 请求路径只读；写入方只有刷新调度器（upsert）与管理端（别名CRUD）
pub struct ModelRegistry {
    db: Arc<DatabaseConnection>,
}

impl ModelRegistry {
    /// 创建注册表实例
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 按 (提供商, 提供商原生模型ID) upsert 一条模型记录
    ///
    /// 已存在时按 COALESCE 语义更新：入参为 `Some` 的字段覆盖现值，
    /// `None` 保留现值。相同输入重复调用是幂等的。
    pub async fn upsert_model(
        &self,
        provider: &provider_types::Model,
        upsert: &ModelUpsert,
    ) -> Result<models::Model> {
        let now = Utc::now().naive_utc();

        let existing = models::Entity::find()
            .filter(models::Column::ProviderTypeId.eq(provider.id))
            .filter(models::Column::ProviderModelId.eq(&upsert.provider_model_id))
            .one(self.db.as_ref())
            .await?;

        if let Some(existing) = existing {
            let mut active: models::ActiveModel = existing.into();
            if let Some(display_name) = &upsert.display_name {
                active.display_name = Set(Some(display_name.clone()));
            }
            if let Some(description) = &upsert.description {
                active.description = Set(Some(description.clone()));
            }
            if let Some(context_length) = upsert.context_length {
                active.context_length = Set(Some(context_length));
            }
            active.updated_at = Set(now);
            return Ok(active.update(self.db.as_ref()).await?);
        }

        let unified_id = unified_model_id(&provider.name, &upsert.provider_model_id);
        ldebug!(
            "system",
            LogStage::Db,
            LogComponent::Registry,
            "insert_model",
            &format!("新增模型记录: {unified_id}")
        );

        let inserted = models::ActiveModel {
            provider_type_id: Set(provider.id),
            provider_model_id: Set(upsert.provider_model_id.clone()),
            unified_id: Set(unified_id),
            display_name: Set(upsert.display_name.clone()),
            description: Set(upsert.description.clone()),
            context_length: Set(upsert.context_length),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(inserted)
    }

    /// 解析调用方标识符为可路由模型
    ///
    /// 查找顺序：团队别名 → 全局别名 → 直接按统一ID。
    /// 未找到返回 `Ok(None)`，绝不以错误表达「不存在」。
    pub async fn resolve_identifier(
        &self,
        identifier: &str,
        team_id: i32,
    ) -> Result<Option<ResolvedModel>> {
        let team_alias = model_aliases::Entity::find()
            .filter(model_aliases::Column::Alias.eq(identifier))
            .filter(model_aliases::Column::TeamId.eq(team_id))
            .one(self.db.as_ref())
            .await?;

        let alias = if team_alias.is_some() {
            team_alias
        } else {
            model_aliases::Entity::find()
                .filter(model_aliases::Column::Alias.eq(identifier))
                .filter(model_aliases::Column::TeamId.is_null())
                .one(self.db.as_ref())
                .await?
        };

        if let Some(alias) = alias {
            // 别名存在但目标缺失属于数据完整性错误，必须显式上报
            let (model, provider) = models::Entity::find_by_id(alias.model_id)
                .find_also_related(provider_types::Entity)
                .one(self.db.as_ref())
                .await?
                .ok_or_else(|| {
                    GatewayError::internal(format!("别名 {identifier} 指向的模型不存在"))
                })?;
            let provider = provider.ok_or_else(|| {
                GatewayError::internal(format!(
                    "模型 {} 引用的提供商不存在",
                    model.unified_id
                ))
            })?;
            return Ok(Some(Self::to_resolved(&model, &provider)));
        }

        let direct = models::Entity::find()
            .filter(models::Column::UnifiedId.eq(identifier))
            .find_also_related(provider_types::Entity)
            .one(self.db.as_ref())
            .await?;

        match direct {
            None => Ok(None),
            Some((model, provider)) => {
                let provider = provider.ok_or_else(|| {
                    GatewayError::internal(format!(
                        "模型 {} 引用的提供商不存在",
                        model.unified_id
                    ))
                })?;
                Ok(Some(Self::to_resolved(&model, &provider)))
            }
        }
    }

    /// 按规范名聚合团队可见的多提供商模型视图
    ///
    /// 可见范围：凭证状态为 active 或 error 的提供商；每个桶内按优先级升序
    pub async fn group_by_canonical_name(
        &self,
        team_id: i32,
    ) -> Result<Vec<MultiProviderModel>> {
        let provider_creds = self
            .team_credentials(team_id, &[credential_status::ACTIVE, credential_status::ERROR])
            .await?;

        if provider_creds.is_empty() {
            return Ok(Vec::new());
        }

        let provider_ids: Vec<i32> = provider_creds.keys().copied().collect();
        let all_models = models::Entity::find()
            .filter(models::Column::ProviderTypeId.is_in(provider_ids))
            .all(self.db.as_ref())
            .await?;

        // canonical name -> entries，BTreeMap 保证输出顺序稳定
        let mut buckets: BTreeMap<String, Vec<ProviderEntry>> = BTreeMap::new();
        // model id -> canonical name，用于别名归桶
        let mut model_bucket: HashMap<i32, String> = HashMap::new();

        for model in &all_models {
            let Some((provider_name, status, priority)) =
                provider_creds.get(&model.provider_type_id)
            else {
                continue;
            };
            let canonical = canonical_model_name(&model.provider_model_id);
            model_bucket.insert(model.id, canonical.clone());
            buckets.entry(canonical).or_default().push(ProviderEntry {
                provider_name: provider_name.clone(),
                provider_model_id: model.provider_model_id.clone(),
                unified_id: model.unified_id.clone(),
                context_length: model.context_length,
                credential_status: status.clone(),
                priority: *priority,
            });
        }

        let model_ids: Vec<i32> = model_bucket.keys().copied().collect();
        let aliases = self.visible_aliases(team_id, &model_ids).await?;

        let mut alias_buckets: HashMap<String, Vec<String>> = HashMap::new();
        for alias in aliases {
            if let Some(canonical) = model_bucket.get(&alias.model_id) {
                alias_buckets
                    .entry(canonical.clone())
                    .or_default()
                    .push(alias.alias);
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(canonical_name, mut providers)| {
                providers.sort_by(|a, b| {
                    a.priority
                        .cmp(&b.priority)
                        .then_with(|| a.provider_name.cmp(&b.provider_name))
                });
                let mut aliases = alias_buckets.remove(&canonical_name).unwrap_or_default();
                aliases.sort();
                MultiProviderModel {
                    canonical_name,
                    providers,
                    aliases,
                }
            })
            .collect())
    }

    /// 在状态为 active 的凭证中选出规范名对应的最优提供商
    ///
    /// 优先级数值最小者胜出，并列时按模型创建时间最早者
    pub async fn best_provider(
        &self,
        canonical_name: &str,
        team_id: i32,
    ) -> Result<Option<ProviderEntry>> {
        let provider_creds = self
            .team_credentials(team_id, &[credential_status::ACTIVE])
            .await?;

        if provider_creds.is_empty() {
            return Ok(None);
        }

        let provider_ids: Vec<i32> = provider_creds.keys().copied().collect();
        let candidates = models::Entity::find()
            .filter(models::Column::ProviderTypeId.is_in(provider_ids))
            .all(self.db.as_ref())
            .await?;

        let mut best: Option<(i32, chrono::NaiveDateTime, i32, ProviderEntry)> = None;
        for model in candidates {
            if canonical_model_name(&model.provider_model_id) != canonical_name {
                continue;
            }
            let Some((provider_name, status, priority)) =
                provider_creds.get(&model.provider_type_id)
            else {
                continue;
            };

            let key = (*priority, model.created_at, model.id);
            let is_better = best
                .as_ref()
                .is_none_or(|(p, c, id, _)| key < (*p, *c, *id));
            if is_better {
                best = Some((
                    *priority,
                    model.created_at,
                    model.id,
                    ProviderEntry {
                        provider_name: provider_name.clone(),
                        provider_model_id: model.provider_model_id,
                        unified_id: model.unified_id,
                        context_length: model.context_length,
                        credential_status: status.clone(),
                        priority: *priority,
                    },
                ));
            }
        }

        Ok(best.map(|(_, _, _, entry)| entry))
    }

    /// 创建别名
    ///
    /// 目标模型不存在时返回 `ModelNotFound`；唯一性由存储层索引兜底，
    /// 调用方仍应先通过 [`Self::alias_exists`] 预检
    pub async fn create_alias(
        &self,
        model_id: i32,
        alias: &str,
        team_id: Option<i32>,
    ) -> Result<model_aliases::Model> {
        let target = models::Entity::find_by_id(model_id)
            .one(self.db.as_ref())
            .await?;
        if target.is_none() {
            return Err(GatewayError::model_not_found(format!("model_id={model_id}")));
        }

        let inserted = model_aliases::ActiveModel {
            model_id: Set(model_id),
            alias: Set(alias.to_string()),
            team_id: Set(team_id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| {
            if e.to_string().to_uppercase().contains("UNIQUE") {
                GatewayError::alias_conflict(alias)
            } else {
                e.into()
            }
        })?;

        Ok(inserted)
    }

    /// 检查别名在给定范围内是否已被占用
    ///
    /// 团队范围的检查同时覆盖同团队与全局两层，与解析时的遮蔽顺序一致
    pub async fn alias_exists(&self, alias: &str, team_id: Option<i32>) -> Result<bool> {
        let mut query = model_aliases::Entity::find()
            .filter(model_aliases::Column::Alias.eq(alias));

        query = match team_id {
            Some(team_id) => query.filter(
                model_aliases::Column::TeamId
                    .eq(team_id)
                    .or(model_aliases::Column::TeamId.is_null()),
            ),
            None => query.filter(model_aliases::Column::TeamId.is_null()),
        };

        Ok(query.one(self.db.as_ref()).await?.is_some())
    }

    /// 删除别名，返回是否确有删除
    pub async fn delete_alias(&self, alias_id: i32) -> Result<bool> {
        let result = model_aliases::Entity::delete_by_id(alias_id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// 渲染团队可见的模型列表（模型 + 别名条目）
    ///
    /// 别名条目的 `parent`/`root` 指向所属模型的统一ID
    pub async fn list_models(&self, team_id: i32) -> Result<Vec<ModelListEntry>> {
        let provider_creds = self
            .team_credentials(team_id, &[credential_status::ACTIVE, credential_status::ERROR])
            .await?;

        if provider_creds.is_empty() {
            return Ok(Vec::new());
        }

        let provider_ids: Vec<i32> = provider_creds.keys().copied().collect();
        let visible_models = models::Entity::find()
            .filter(models::Column::ProviderTypeId.is_in(provider_ids))
            .all(self.db.as_ref())
            .await?;

        let mut unified_by_model: HashMap<i32, (String, Option<String>, Option<i32>)> =
            HashMap::new();
        let mut entries: Vec<ModelListEntry> = Vec::with_capacity(visible_models.len());

        for model in visible_models {
            unified_by_model.insert(
                model.id,
                (
                    model.unified_id.clone(),
                    model.display_name.clone(),
                    model.context_length,
                ),
            );
            entries.push(ModelListEntry {
                id: model.unified_id,
                parent: None,
                root: None,
                display_name: model.display_name,
                context_length: model.context_length,
            });
        }

        let model_ids: Vec<i32> = unified_by_model.keys().copied().collect();
        for alias in self.visible_aliases(team_id, &model_ids).await? {
            let Some((unified_id, display_name, context_length)) =
                unified_by_model.get(&alias.model_id)
            else {
                continue;
            };
            entries.push(ModelListEntry {
                id: alias.alias,
                parent: Some(unified_id.clone()),
                root: Some(unified_id.clone()),
                display_name: display_name.clone(),
                context_length: *context_length,
            });
        }

        Ok(entries)
    }

    /// 按提供商范围删除模型记录（凭证移除时的级联清理）
    ///
    /// 指向这些模型的别名依靠外键级联一并删除
    pub async fn purge_provider_models(&self, provider_type_id: i32) -> Result<u64> {
        let result = models::Entity::delete_many()
            .filter(models::Column::ProviderTypeId.eq(provider_type_id))
            .exec(self.db.as_ref())
            .await?;

        ldebug!(
            "system",
            LogStage::Db,
            LogComponent::Registry,
            "purge_provider_models",
            &format!(
                "清理提供商模型: provider_type_id={provider_type_id}, deleted={}",
                result.rows_affected
            )
        );
        Ok(result.rows_affected)
    }

    /// 团队在给定凭证状态集合下可达的提供商映射
    ///
    /// 同一提供商存在多个凭证时取 (状态偏好, 优先级) 最优的一个：
    /// active 优先于 error，再按优先级数值升序
    async fn team_credentials(
        &self,
        team_id: i32,
        statuses: &[&str],
    ) -> Result<HashMap<i32, (String, String, i32)>> {
        let rows = provider_credentials::Entity::find()
            .filter(provider_credentials::Column::TeamId.eq(team_id))
            .filter(provider_credentials::Column::Status.is_in(statuses.iter().copied()))
            .find_also_related(provider_types::Entity)
            .all(self.db.as_ref())
            .await?;

        let mut map: HashMap<i32, (String, String, i32)> = HashMap::new();
        for (credential, provider) in rows {
            let provider = provider.ok_or_else(|| {
                GatewayError::internal(format!(
                    "凭证 {} 引用的提供商不存在",
                    credential.id
                ))
            })?;

            let rank = |status: &str, priority: i32| {
                (i32::from(status != credential_status::ACTIVE), priority)
            };
            let candidate = rank(&credential.status, credential.priority);
            let replace = map
                .get(&provider.id)
                .is_none_or(|(_, status, priority)| candidate < rank(status, *priority));
            if replace {
                map.insert(
                    provider.id,
                    (provider.name, credential.status, credential.priority),
                );
            }
        }

        Ok(map)
    }

    /// 团队可见（团队范围 + 全局）且指向给定模型集合的别名
    async fn visible_aliases(
        &self,
        team_id: i32,
        model_ids: &[i32],
    ) -> Result<Vec<model_aliases::Model>> {
        if model_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(model_aliases::Entity::find()
            .filter(model_aliases::Column::ModelId.is_in(model_ids.iter().copied()))
            .filter(
                model_aliases::Column::TeamId
                    .eq(team_id)
                    .or(model_aliases::Column::TeamId.is_null()),
            )
            .all(self.db.as_ref())
            .await?)
    }

    fn to_resolved(model: &models::Model, provider: &provider_types::Model) -> ResolvedModel {
        ResolvedModel {
            model_id: model.id,
            provider_type_id: provider.id,
            provider_name: provider.name.clone(),
            provider_model_id: model.provider_model_id.clone(),
            unified_id: model.unified_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use crate::testing::helpers::create_test_db;
    use entity::provider_credentials::status;

    async fn setup() -> (Arc<DatabaseConnection>, ModelRegistry) {
        let db = Arc::new(create_test_db().await.expect("test db"));
        let registry = ModelRegistry::new(Arc::clone(&db));
        (db, registry)
    }

    #[tokio::test]
    async fn upsert_is_idempotent_and_coalesces() {
        let (db, registry) = setup().await;
        let provider = fixtures::provider_by_name(&db, "openai").await;

        let first = registry
            .upsert_model(
                &provider,
                &ModelUpsert {
                    provider_model_id: "gpt-4".to_string(),
                    display_name: Some("GPT-4".to_string()),
                    description: None,
                    context_length: Some(8192),
                },
            )
            .await
            .expect("insert");
        assert_eq!(first.unified_id, "openai:gpt-4");

        // None 字段保留现值，Some 字段覆盖
        let second = registry
            .upsert_model(
                &provider,
                &ModelUpsert {
                    provider_model_id: "gpt-4".to_string(),
                    display_name: None,
                    description: Some("flagship".to_string()),
                    context_length: None,
                },
            )
            .await
            .expect("update");

        assert_eq!(second.id, first.id);
        assert_eq!(second.display_name.as_deref(), Some("GPT-4"));
        assert_eq!(second.description.as_deref(), Some("flagship"));
        assert_eq!(second.context_length, Some(8192));

        // 相同输入重复调用不产生新行
        let third = registry
            .upsert_model(&provider, &ModelUpsert::new("gpt-4"))
            .await
            .expect("noop upsert");
        assert_eq!(third.id, first.id);
    }

    #[tokio::test]
    async fn resolve_prefers_team_alias_over_global() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        let anthropic = fixtures::provider_by_name(&db, "anthropic").await;

        let gpt = registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();
        let claude = registry
            .upsert_model(&anthropic, &ModelUpsert::new("claude-3-5-sonnet-20241022"))
            .await
            .unwrap();

        registry
            .create_alias(gpt.id, "best", None)
            .await
            .expect("global alias");
        registry
            .create_alias(claude.id, "best", Some(team_id))
            .await
            .expect("team alias");

        let resolved = registry
            .resolve_identifier("best", team_id)
            .await
            .unwrap()
            .expect("resolved");
        assert_eq!(resolved.unified_id, "anthropic:claude-3-5-sonnet-20241022");

        // 其他团队只看到全局别名
        let other_team = fixtures::insert_team(&db, "other").await;
        let resolved = registry
            .resolve_identifier("best", other_team)
            .await
            .unwrap()
            .expect("resolved");
        assert_eq!(resolved.unified_id, "openai:gpt-4");
    }

    #[tokio::test]
    async fn resolve_falls_back_to_unified_id_and_none() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();

        let resolved = registry
            .resolve_identifier("openai:gpt-4", team_id)
            .await
            .unwrap()
            .expect("direct unified id");
        assert_eq!(resolved.provider_name, "openai");
        assert_eq!(resolved.provider_model_id, "gpt-4");

        assert!(
            registry
                .resolve_identifier("openai:missing", team_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn create_alias_requires_existing_model() {
        let (_db, registry) = setup().await;
        let err = registry.create_alias(9999, "ghost", None).await.unwrap_err();
        assert!(matches!(err, GatewayError::ModelNotFound { .. }));
    }

    #[tokio::test]
    async fn alias_exists_checks_scope_precedence() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        let gpt = registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();

        registry.create_alias(gpt.id, "gpt4", None).await.unwrap();

        // 全局别名同时挡住团队范围创建
        assert!(registry.alias_exists("gpt4", Some(team_id)).await.unwrap());
        assert!(registry.alias_exists("gpt4", None).await.unwrap());
        assert!(!registry.alias_exists("gpt4-turbo", None).await.unwrap());

        // 团队别名不影响全局范围
        registry
            .create_alias(gpt.id, "team-only", Some(team_id))
            .await
            .unwrap();
        assert!(!registry.alias_exists("team-only", None).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_alias_in_same_scope_conflicts() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        let gpt = registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();

        registry
            .create_alias(gpt.id, "gpt4", Some(team_id))
            .await
            .unwrap();
        let err = registry
            .create_alias(gpt.id, "gpt4", Some(team_id))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::AliasConflict { .. }));
    }

    #[tokio::test]
    async fn best_provider_picks_lowest_priority_active() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        let azure = fixtures::provider_by_name(&db, "azure").await;

        registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();
        registry
            .upsert_model(&azure, &ModelUpsert::new("gpt-4-20240101"))
            .await
            .unwrap();

        // openai 凭证错误、azure 活跃：即便 openai 优先级更高也必须选 azure
        fixtures::insert_credential(&db, team_id, openai.id, status::ERROR, 0, true).await;
        fixtures::insert_credential(&db, team_id, azure.id, status::ACTIVE, 1, true).await;

        let best = registry
            .best_provider("gpt-4", team_id)
            .await
            .unwrap()
            .expect("best provider");
        assert_eq!(best.provider_name, "azure");
        assert_eq!(best.unified_id, "azure:gpt-4-20240101");
        assert_eq!(best.credential_status, status::ACTIVE);

        // 没有任何 active 提供商时返回 None
        assert!(
            registry
                .best_provider("claude-3", team_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn group_by_canonical_name_buckets_and_sorts() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;
        let azure = fixtures::provider_by_name(&db, "azure").await;

        let gpt = registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();
        registry
            .upsert_model(&azure, &ModelUpsert::new("gpt-4-20240101"))
            .await
            .unwrap();
        registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-3.5-turbo"))
            .await
            .unwrap();

        fixtures::insert_credential(&db, team_id, azure.id, status::ACTIVE, 1, true).await;
        fixtures::insert_credential(&db, team_id, openai.id, status::ERROR, 2, true).await;
        registry.create_alias(gpt.id, "gpt4", None).await.unwrap();

        let grouped = registry.group_by_canonical_name(team_id).await.unwrap();
        assert_eq!(grouped.len(), 2);

        let gpt4_bucket = grouped
            .iter()
            .find(|g| g.canonical_name == "gpt-4")
            .expect("gpt-4 bucket");
        assert_eq!(gpt4_bucket.providers.len(), 2);
        // 桶内按优先级升序：azure(1) 在 openai(2) 之前
        assert_eq!(gpt4_bucket.providers[0].provider_name, "azure");
        assert_eq!(gpt4_bucket.providers[1].provider_name, "openai");
        assert_eq!(gpt4_bucket.aliases, vec!["gpt4".to_string()]);
    }

    #[tokio::test]
    async fn list_models_contains_models_plus_aliases() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;

        let gpt = registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();
        let turbo = registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-3.5-turbo"))
            .await
            .unwrap();
        fixtures::insert_credential(&db, team_id, openai.id, status::ACTIVE, 1, true).await;

        registry.create_alias(gpt.id, "gpt4", None).await.unwrap();
        registry
            .create_alias(turbo.id, "turbo", Some(team_id))
            .await
            .unwrap();

        let entries = registry.list_models(team_id).await.unwrap();
        // 恰好 |Models| + |Aliases| 条
        assert_eq!(entries.len(), 4);

        for entry in &entries {
            match entry.id.as_str() {
                "gpt4" => {
                    assert_eq!(entry.parent.as_deref(), Some("openai:gpt-4"));
                    assert_eq!(entry.root.as_deref(), Some("openai:gpt-4"));
                }
                "turbo" => {
                    assert_eq!(entry.parent.as_deref(), Some("openai:gpt-3.5-turbo"));
                }
                _ => {
                    assert!(entry.parent.is_none());
                    assert!(entry.root.is_none());
                }
            }
        }
    }

    #[tokio::test]
    async fn purge_provider_models_cascades_aliases() {
        let (db, registry) = setup().await;
        let team_id = fixtures::default_team_id(&db).await;
        let openai = fixtures::provider_by_name(&db, "openai").await;

        let gpt = registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();
        registry.create_alias(gpt.id, "gpt4", None).await.unwrap();

        let deleted = registry.purge_provider_models(openai.id).await.unwrap();
        assert_eq!(deleted, 1);

        assert!(
            registry
                .resolve_identifier("openai:gpt-4", team_id)
                .await
                .unwrap()
                .is_none()
        );
        let remaining = model_aliases::Entity::find()
            .all(db.as_ref())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
