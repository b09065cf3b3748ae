//! # LLM Gateway 主程序
//!
//! 多提供商LLM网关 - 启动模型刷新调度器并维持进程生命周期；
//! HTTP接入层作为独立部件挂载本库导出的解析器与限流器

use std::sync::Arc;

use sea_orm::EntityTrait;

use llm_gateway::{
    GatewayError, Result,
    cache::{CounterStore, MemoryCounterStore, RedisCounterStore},
    config::{self, CacheType},
    credentials::SeaOrmCredentialStore,
    database, lerror, linfo,
    logging::{self, LogComponent, LogStage},
    lwarn,
    providers::AdapterRegistry,
    registry::ModelRegistry,
    scheduler::{ModelRefreshService, ModelRefreshTask},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志系统
    logging::init_logging(None);

    // 加载配置；配置文件缺失时退回默认值以便开箱即用
    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            lwarn!(
                "system",
                LogStage::Startup,
                LogComponent::Main,
                "config_fallback",
                &format!("配置加载失败，使用默认配置: {e}")
            );
            llm_gateway::AppConfig::default()
        }
    };

    // 数据库连接与迁移
    let db_url = config.database.get_connection_url()?;
    let db = database::init_database(&db_url)
        .await
        .map_err(|e| GatewayError::database_with_source("数据库连接失败", e))?;
    database::run_migrations(&db)
        .await
        .map_err(|e| GatewayError::database_with_source("数据库迁移失败", e))?;
    let db = Arc::new(db);

    // 计数器存储：限流与配额的后端
    let counter_store: Arc<dyn CounterStore> = match config.cache.cache_type {
        CacheType::Redis => {
            let redis_config = config.cache.redis.clone().ok_or_else(|| {
                GatewayError::config("cache_type 为 redis 时必须提供 [cache.redis] 配置")
            })?;
            Arc::new(RedisCounterStore::new(redis_config).await?)
        }
        CacheType::Memory => Arc::new(MemoryCounterStore::new()),
    };
    if let Err(e) = counter_store.ping().await {
        lwarn!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "counter_store_unreachable",
            &format!("计数器存储探测失败，限流与配额将按拒绝处理: {e}")
        );
    }

    // 核心组件装配：注册表、凭证存储、适配器注册表、刷新服务
    let registry = Arc::new(ModelRegistry::new(Arc::clone(&db)));
    let credentials = Arc::new(SeaOrmCredentialStore::new(Arc::clone(&db)));

    let providers = entity::provider_types::Entity::find()
        .all(db.as_ref())
        .await
        .map_err(|e| GatewayError::database_with_source("加载提供商列表失败", e))?;
    let adapters = Arc::new(AdapterRegistry::from_providers(&providers));

    let refresh_service = Arc::new(ModelRefreshService::new(
        registry,
        credentials,
        adapters,
        config.refresh.clone(),
    ));

    // 调度器是显式构造的长生命周期对象，由 main 持有并启停
    let refresh_task = ModelRefreshTask::new(refresh_service);
    refresh_task.start().await?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_started",
        "服务启动完成，等待退出信号"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        lerror!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "signal_error",
            &format!("等待退出信号失败: {e}")
        );
    }

    refresh_task.stop().await?;

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}
