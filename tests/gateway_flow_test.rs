//! 网关核心链路集成测试
//!
//! 刷新调度器入库 → 解析器路由 → 限流/配额门控的端到端流程

use async_trait::async_trait;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use std::sync::Arc;

use llm_gateway::cache::MemoryCounterStore;
use llm_gateway::credentials::{CredentialStore, SeaOrmCredentialStore};
use llm_gateway::limiter::{QuotaService, RateLimitConfig, RateLimiter};
use llm_gateway::providers::{
    AdapterRegistry, ChatCompletionRequest, ChatCompletionResponse, ChatStream, DiscoveredModel,
    ProviderAdapter, ProviderError, ProviderResult, TokenUsage,
};
use llm_gateway::registry::ModelRegistry;
use llm_gateway::resolver::{ModelResolver, ResolutionErrorCode};
use llm_gateway::scheduler::{ModelRefreshService, RefreshConfig};
use llm_gateway::GatewayError;

async fn setup_test_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect test db");
    Migrator::up(&db, None).await.expect("run migrations");
    Arc::new(db)
}

async fn provider_by_name(db: &DatabaseConnection, name: &str) -> entity::provider_types::Model {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    entity::provider_types::Entity::find()
        .filter(entity::provider_types::Column::Name.eq(name))
        .one(db)
        .await
        .expect("query provider")
        .expect("seeded provider")
}

async fn default_team_id(db: &DatabaseConnection) -> i32 {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    entity::teams::Entity::find()
        .filter(entity::teams::Column::Name.eq("default"))
        .one(db)
        .await
        .expect("query team")
        .expect("seeded team")
        .id
}

async fn insert_active_credential(
    db: &DatabaseConnection,
    team_id: i32,
    provider_type_id: i32,
    priority: i32,
) -> entity::provider_credentials::Model {
    let now = Utc::now().naive_utc();
    entity::provider_credentials::ActiveModel {
        team_id: Set(team_id),
        provider_type_id: Set(provider_type_id),
        api_key: Set("sk-integration-test".to_string()),
        name: Set(format!("cred-{provider_type_id}")),
        status: Set("active".to_string()),
        is_default: Set(true),
        priority: Set(priority),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert credential")
}

/// 返回固定模型目录的测试适配器
struct StaticAdapter {
    name: String,
    models: Vec<DiscoveredModel>,
}

#[async_trait]
impl ProviderAdapter for StaticAdapter {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn list_models(
        &self,
        _credential: &entity::provider_credentials::Model,
    ) -> ProviderResult<Vec<DiscoveredModel>> {
        Ok(self.models.clone())
    }

    async fn chat_completion(
        &self,
        _credential: &entity::provider_credentials::Model,
        _request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatCompletionResponse> {
        Ok(ChatCompletionResponse {
            body: serde_json::json!({"choices": []}),
            usage: TokenUsage {
                prompt_tokens: 7,
                completion_tokens: 3,
                total_tokens: 10,
            },
        })
    }

    async fn chat_completion_stream(
        &self,
        _credential: &entity::provider_credentials::Model,
        _request: &ChatCompletionRequest,
    ) -> ProviderResult<ChatStream> {
        Err(ProviderError::UnsupportedOperation(
            "streaming not exercised here".to_string(),
        ))
    }
}

fn adapters_with_catalog() -> Arc<AdapterRegistry> {
    let mut adapters = AdapterRegistry::new();
    adapters.register(Arc::new(StaticAdapter {
        name: "openai".to_string(),
        models: vec![
            DiscoveredModel::new("gpt-4"),
            DiscoveredModel::new("gpt-3.5-turbo"),
        ],
    }));
    adapters.register(Arc::new(StaticAdapter {
        name: "azure".to_string(),
        models: vec![DiscoveredModel::new("gpt-4-20240101")],
    }));
    Arc::new(adapters)
}

#[tokio::test]
async fn refresh_then_resolve_then_route() {
    let db = setup_test_db().await;
    let team_id = default_team_id(&db).await;
    let openai = provider_by_name(&db, "openai").await;
    let azure = provider_by_name(&db, "azure").await;
    insert_active_credential(&db, team_id, openai.id, 2).await;
    insert_active_credential(&db, team_id, azure.id, 1).await;

    let registry = Arc::new(ModelRegistry::new(Arc::clone(&db)));
    let credentials = Arc::new(SeaOrmCredentialStore::new(Arc::clone(&db)));
    let adapters = adapters_with_catalog();

    // 后台刷新周期把两家提供商的目录灌入注册表
    let refresh = ModelRefreshService::new(
        Arc::clone(&registry),
        Arc::clone(&credentials) as Arc<dyn CredentialStore>,
        Arc::clone(&adapters),
        RefreshConfig::default(),
    );
    let stats = refresh.process_refresh_cycle().await;
    assert!(stats.ran);
    assert_eq!(stats.refreshed, 2);
    assert_eq!(stats.failed, 0);

    // 规范名 gpt-4 聚合了两家提供商；azure 优先级更小排在前面
    let grouped = registry.group_by_canonical_name(team_id).await.unwrap();
    let gpt4 = grouped
        .iter()
        .find(|g| g.canonical_name == "gpt-4")
        .expect("gpt-4 bucket");
    assert_eq!(gpt4.providers.len(), 2);
    assert_eq!(gpt4.providers[0].provider_name, "azure");

    // 最优提供商与解析路由
    let best = registry
        .best_provider("gpt-4", team_id)
        .await
        .unwrap()
        .expect("best provider");
    assert_eq!(best.unified_id, "azure:gpt-4-20240101");

    let resolver = ModelResolver::new(
        Arc::clone(&registry),
        adapters,
        credentials as Arc<dyn CredentialStore>,
    );
    let target = resolver
        .resolve_for_routing(&best.unified_id, team_id)
        .await
        .expect("routing target");
    assert_eq!(target.provider_name, "azure");
    assert_eq!(target.provider_model_id, "gpt-4-20240101");

    // 路由目标可直接驱动适配器调用
    let request = ChatCompletionRequest {
        model: target.provider_model_id.clone(),
        messages: vec![serde_json::json!({"role": "user", "content": "hi"})],
        max_tokens: None,
        temperature: None,
        stream: false,
    };
    let response = target
        .adapter
        .chat_completion(&target.credential, &request)
        .await
        .expect("completion");
    assert_eq!(response.usage.total_tokens, 10);
}

#[tokio::test]
async fn resolution_errors_carry_exactly_one_code() {
    let db = setup_test_db().await;
    let team_id = default_team_id(&db).await;
    let anthropic = provider_by_name(&db, "anthropic").await;

    let registry = Arc::new(ModelRegistry::new(Arc::clone(&db)));
    let credentials = Arc::new(SeaOrmCredentialStore::new(Arc::clone(&db)));

    // anthropic 的模型在库里，但没有适配器也没有凭证
    registry
        .upsert_model(
            &anthropic,
            &llm_gateway::registry::ModelUpsert::new("claude-3-5-sonnet-20241022"),
        )
        .await
        .unwrap();

    let resolver = ModelResolver::new(
        Arc::clone(&registry),
        Arc::new(AdapterRegistry::new()),
        credentials as Arc<dyn CredentialStore>,
    );

    let err = resolver
        .resolve_for_routing("does-not-exist", team_id)
        .await
        .unwrap_err();
    match err {
        GatewayError::ModelResolution { code, .. } => {
            assert_eq!(code, ResolutionErrorCode::ModelNotFound);
            assert_eq!(code.status_code().as_u16(), 404);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = resolver
        .resolve_for_routing("anthropic:claude-3-5-sonnet-20241022", team_id)
        .await
        .unwrap_err();
    match err {
        GatewayError::ModelResolution { code, .. } => {
            assert_eq!(code, ResolutionErrorCode::NoAdapter);
            assert_eq!(code.status_code().as_u16(), 500);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn request_path_gates_compose() {
    let store = Arc::new(MemoryCounterStore::new());
    let limiter = RateLimiter::new(
        Arc::clone(&store) as _,
        RateLimitConfig {
            default_rpm: 2,
            window_seconds: 60,
        },
    );
    let quota = QuotaService::new(Arc::clone(&store) as _);

    // 请求一：限流与配额都放行，完成后计入用量
    let rate = limiter.check("ak_live", None).await;
    assert!(rate.allowed);
    let pre = quota.check("proj_live", 10, Some(15)).await;
    assert!(pre.allowed);
    quota.consume("proj_live", 10).await;

    // 请求二：配额只剩 5 token，预检拒绝
    let rate = limiter.check("ak_live", None).await;
    assert!(rate.allowed);
    let pre = quota.check("proj_live", 10, Some(15)).await;
    assert!(!pre.allowed);
    assert_eq!(pre.remaining, Some(5));
    assert_eq!(pre.used, 10);

    // 请求三：速率窗口耗尽
    let rate = limiter.check("ak_live", None).await;
    assert!(!rate.allowed);
    assert_eq!(rate.remaining, 0);
    assert!(rate.retry_after.is_some_and(|s| s > 0));
}
