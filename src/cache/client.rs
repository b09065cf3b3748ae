//! # Redis 计数器客户端
//!
//! 提供 Redis 连接管理和原子计数操作

use crate::{
    ldebug, linfo,
    logging::{LogComponent, LogStage},
};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;

use crate::config::RedisConfig;
use crate::error::{GatewayError, Result};

use super::store::CounterStore;

/// Redis 计数器存储
pub struct RedisCounterStore {
    /// Redis 连接管理器
    connection_manager: ConnectionManager,
    /// 配置信息
    config: RedisConfig,
}

impl RedisCounterStore {
    /// 创建新的 Redis 计数器存储
    pub async fn new(config: RedisConfig) -> Result<Self> {
        linfo!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "connect_to_redis",
            &format!("正在连接 Redis 服务器: {}:{}", config.host, config.port)
        );

        let client = Client::open(config.build_url())
            .map_err(|e| GatewayError::cache_with_source("创建 Redis 客户端失败", e))?;

        let connection_manager = ConnectionManager::new(client)
            .await
            .map_err(|e| GatewayError::cache_with_source("建立 Redis 连接失败", e))?;

        linfo!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "redis_connected",
            "Redis 连接建立成功"
        );

        Ok(Self {
            connection_manager,
            config,
        })
    }

    /// 获取配置信息
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let mut conn = self.connection_manager.clone();

        let value: i64 = conn
            .incr(key, delta)
            .await
            .map_err(|e| GatewayError::cache_with_source(format!("计数自增失败: {key}"), e))?;

        ldebug!(
            "system",
            LogStage::Cache,
            LogComponent::Cache,
            "incr",
            &format!("计数自增: key={key}, value={value}")
        );
        Ok(value)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        let mut conn = self.connection_manager.clone();

        let value: Option<i64> = conn
            .get(key)
            .await
            .map_err(|e| GatewayError::cache_with_source(format!("读取计数失败: {key}"), e))?;

        Ok(value)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection_manager.clone();

        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|e| GatewayError::cache_with_source(format!("获取TTL失败: {key}"), e))?;

        Ok(ttl)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.connection_manager.clone();

        #[allow(clippy::cast_possible_wrap)]
        let success: bool = conn
            .expire(key, ttl.as_secs() as i64)
            .await
            .map_err(|e| GatewayError::cache_with_source(format!("设置过期时间失败: {key}"), e))?;

        Ok(success)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection_manager.clone();

        let response: String = redis::Cmd::new()
            .arg("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| GatewayError::cache_with_source("Redis ping 失败", e))?;

        if response == "PONG" {
            Ok(())
        } else {
            Err(GatewayError::cache(format!(
                "Redis ping 响应异常: {response}"
            )))
        }
    }
}

impl Clone for RedisCounterStore {
    fn clone(&self) -> Self {
        Self {
            connection_manager: self.connection_manager.clone(),
            config: self.config.clone(),
        }
    }
}
