//! # 路由解析器
//!
//! 把调用方的模型标识符解析为 (提供商, 原生模型ID, 凭证, 适配器) 的完整路由目标

pub mod types;

pub use types::{ResolutionErrorCode, RoutingTarget};

use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::error::{GatewayError, Result};
use crate::providers::AdapterRegistry;
use crate::registry::{ModelRegistry, parse_unified_id};
use crate::{
    ldebug,
    logging::{LogComponent, LogStage},
};

/// 模型解析服务
///
/// 三段失败阶梯：标识符 → 适配器 → 凭证；要么完整成功，
/// 要么携带恰好一个 [`ResolutionErrorCode`] 失败
pub struct ModelResolver {
    registry: Arc<ModelRegistry>,
    adapters: Arc<AdapterRegistry>,
    credentials: Arc<dyn CredentialStore>,
}

impl ModelResolver {
    /// 创建解析服务
    #[must_use]
    pub fn new(
        registry: Arc<ModelRegistry>,
        adapters: Arc<AdapterRegistry>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            registry,
            adapters,
            credentials,
        }
    }

    /// 解析调用方标识符为完整路由目标
    pub async fn resolve_for_routing(
        &self,
        identifier: &str,
        team_id: i32,
    ) -> Result<RoutingTarget> {
        let resolved = self
            .registry
            .resolve_identifier(identifier, team_id)
            .await?
            .ok_or_else(|| {
                GatewayError::model_resolution(
                    ResolutionErrorCode::ModelNotFound,
                    format!("模型或别名不存在: {identifier}"),
                )
            })?;

        let adapter = self.adapters.get(&resolved.provider_name).ok_or_else(|| {
            GatewayError::model_resolution(
                ResolutionErrorCode::NoAdapter,
                format!("提供商未注册适配器: {}", resolved.provider_name),
            )
        })?;

        let credential = self
            .credentials
            .get_credential(team_id, &resolved.provider_name)
            .await?
            .ok_or_else(|| {
                GatewayError::model_resolution(
                    ResolutionErrorCode::NoCredentials,
                    format!(
                        "团队 {team_id} 没有提供商 {} 的可用凭证",
                        resolved.provider_name
                    ),
                )
            })?;

        ldebug!(
            "system",
            LogStage::Routing,
            LogComponent::Resolver,
            "resolved",
            &format!("标识符 {identifier} 解析为 {}", resolved.unified_id),
            credential_id = credential.id
        );

        Ok(RoutingTarget {
            provider_name: resolved.provider_name,
            provider_model_id: resolved.provider_model_id,
            unified_id: resolved.unified_id,
            credential,
            adapter,
        })
    }

    /// 只取标识符对应的提供商字符串ID
    ///
    /// 注册表没有记录时，回退为直接解析 `provider:` 前缀，
    /// 以支持注册表尚未缓存的模型标识符
    pub async fn provider_id_from_identifier(
        &self,
        identifier: &str,
        team_id: i32,
    ) -> Result<String> {
        if let Some(resolved) = self.registry.resolve_identifier(identifier, team_id).await? {
            return Ok(resolved.provider_name);
        }

        parse_unified_id(identifier)
            .map(|(provider, _)| provider.to_string())
            .ok_or_else(|| {
                GatewayError::model_resolution(
                    ResolutionErrorCode::ModelNotFound,
                    format!("无法从标识符推断提供商: {identifier}"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelUpsert;
    use crate::testing::fixtures;
    use crate::testing::helpers::create_test_db;
    use crate::testing::mocks::MockAdapter;
    use entity::provider_credentials::status;

    struct Harness {
        db: Arc<sea_orm::DatabaseConnection>,
        registry: Arc<ModelRegistry>,
    }

    async fn harness() -> Harness {
        let db = Arc::new(create_test_db().await.unwrap());
        let registry = Arc::new(ModelRegistry::new(Arc::clone(&db)));
        Harness { db, registry }
    }

    fn resolver_with(harness: &Harness, adapters: AdapterRegistry) -> ModelResolver {
        let credentials = Arc::new(crate::credentials::SeaOrmCredentialStore::new(Arc::clone(
            &harness.db,
        )));
        ModelResolver::new(
            Arc::clone(&harness.registry),
            Arc::new(adapters),
            credentials,
        )
    }

    fn expect_code(err: &GatewayError, expected: ResolutionErrorCode) {
        match err {
            GatewayError::ModelResolution { code, .. } => assert_eq!(*code, expected),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_identifier_is_model_not_found() {
        let h = harness().await;
        let resolver = resolver_with(&h, AdapterRegistry::new());
        let team_id = fixtures::default_team_id(&h.db).await;

        let err = resolver
            .resolve_for_routing("nope", team_id)
            .await
            .unwrap_err();
        expect_code(&err, ResolutionErrorCode::ModelNotFound);
    }

    #[tokio::test]
    async fn missing_adapter_is_no_adapter() {
        let h = harness().await;
        let team_id = fixtures::default_team_id(&h.db).await;
        let openai = fixtures::provider_by_name(&h.db, "openai").await;
        h.registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();

        let resolver = resolver_with(&h, AdapterRegistry::new());
        let err = resolver
            .resolve_for_routing("openai:gpt-4", team_id)
            .await
            .unwrap_err();
        expect_code(&err, ResolutionErrorCode::NoAdapter);
    }

    #[tokio::test]
    async fn missing_credential_is_no_credentials() {
        let h = harness().await;
        let team_id = fixtures::default_team_id(&h.db).await;
        let openai = fixtures::provider_by_name(&h.db, "openai").await;
        h.registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();

        let mut adapters = AdapterRegistry::new();
        adapters.register(Arc::new(MockAdapter::new("openai", vec![])));

        let resolver = resolver_with(&h, adapters);
        let err = resolver
            .resolve_for_routing("openai:gpt-4", team_id)
            .await
            .unwrap_err();
        expect_code(&err, ResolutionErrorCode::NoCredentials);
    }

    #[tokio::test]
    async fn full_resolution_composes_target() {
        let h = harness().await;
        let team_id = fixtures::default_team_id(&h.db).await;
        let openai = fixtures::provider_by_name(&h.db, "openai").await;
        let model = h
            .registry
            .upsert_model(&openai, &ModelUpsert::new("gpt-4"))
            .await
            .unwrap();
        h.registry
            .create_alias(model.id, "gpt4", None)
            .await
            .unwrap();
        let credential =
            fixtures::insert_credential(&h.db, team_id, openai.id, status::ACTIVE, 1, true).await;

        let mut adapters = AdapterRegistry::new();
        adapters.register(Arc::new(MockAdapter::new("openai", vec![])));
        let resolver = resolver_with(&h, adapters);

        // 别名与统一ID都要能解析到同一目标
        for identifier in ["gpt4", "openai:gpt-4"] {
            let target = resolver
                .resolve_for_routing(identifier, team_id)
                .await
                .expect("resolved");
            assert_eq!(target.provider_name, "openai");
            assert_eq!(target.provider_model_id, "gpt-4");
            assert_eq!(target.unified_id, "openai:gpt-4");
            assert_eq!(target.credential.id, credential.id);
            assert_eq!(target.adapter.provider_name(), "openai");
        }
    }

    #[tokio::test]
    async fn provider_id_falls_back_to_prefix_parse() {
        let h = harness().await;
        let team_id = fixtures::default_team_id(&h.db).await;
        let resolver = resolver_with(&h, AdapterRegistry::new());

        // 注册表没有该模型，但前缀可推断提供商
        let provider = resolver
            .provider_id_from_identifier("openai:not-cached-yet", team_id)
            .await
            .unwrap();
        assert_eq!(provider, "openai");

        let err = resolver
            .provider_id_from_identifier("noprefix", team_id)
            .await
            .unwrap_err();
        expect_code(&err, ResolutionErrorCode::ModelNotFound);
    }
}
