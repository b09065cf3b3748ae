//! # 配置管理模块
//!
//! 处理应用配置加载、验证和管理

mod app_config;
mod database;

pub use app_config::{AppConfig, CacheConfig, CacheType, RedisConfig};
pub use database::DatabaseConfig;

use std::env;
use std::path::Path;

/// 加载配置文件
///
/// 按 `RUST_ENV` 选择 `config/config.{env}.toml`
pub fn load_config() -> crate::error::Result<AppConfig> {
    let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    let config_file = format!("config/config.{env}.toml");

    if !Path::new(&config_file).exists() {
        return Err(crate::error::GatewayError::config(format!(
            "配置文件不存在: {config_file}"
        )));
    }

    let config_content = std::fs::read_to_string(&config_file).map_err(|e| {
        crate::error::GatewayError::config_with_source(
            format!("读取配置文件失败: {config_file}"),
            e,
        )
    })?;

    let config: AppConfig = toml::from_str(&config_content)?;

    validate_config(&config)?;

    Ok(config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> crate::error::Result<()> {
    if config.database.url.is_empty() {
        return Err(crate::error::GatewayError::config("数据库URL不能为空"));
    }

    if matches!(config.cache.cache_type, CacheType::Redis) && config.cache.redis.is_none() {
        return Err(crate::error::GatewayError::config(
            "cache_type 为 redis 时必须提供 [cache.redis] 配置",
        ));
    }

    if config.rate_limit.default_rpm == 0 {
        return Err(crate::error::GatewayError::config(
            "默认速率限制必须大于 0",
        ));
    }

    if config.refresh.backoff_multiplier < 1.0 {
        return Err(crate::error::GatewayError::config(
            "退避倍数必须不小于 1.0",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn redis_cache_requires_redis_section() {
        let config = AppConfig {
            cache: CacheConfig {
                cache_type: CacheType::Redis,
                redis: None,
                ..CacheConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
