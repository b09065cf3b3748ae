//! # 应用配置结构定义

use crate::limiter::RateLimitConfig;
use crate::scheduler::RefreshConfig;
use serde::{Deserialize, Serialize};

/// 应用主配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 数据库配置
    pub database: super::DatabaseConfig,
    /// 缓存配置
    pub cache: CacheConfig,
    /// 速率限制配置
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// 模型目录刷新配置
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// 缓存类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    /// 内存缓存
    Memory,
    /// Redis缓存
    Redis,
}

impl Default for CacheType {
    fn default() -> Self {
        Self::Memory
    }
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 缓存类型
    pub cache_type: CacheType,
    /// 内存缓存最大条目数
    pub memory_max_entries: usize,
    /// 默认过期时间（秒）
    pub default_ttl: u64,
    /// Redis 缓存配置
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::Memory,
            memory_max_entries: 10000,
            default_ttl: 300,
            redis: None,
        }
    }
}

/// Redis配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// 服务器地址
    pub host: String,
    /// 服务器端口
    pub port: u16,
    /// 数据库编号
    pub database: u8,
    /// 连接密码（可选）
    pub password: Option<String>,
    /// 连接超时时间（秒）
    pub connection_timeout: u64,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            database: 0,
            password: None,
            connection_timeout: 10,
            max_connections: 10,
        }
    }
}

impl RedisConfig {
    /// 构建 Redis 连接 URL
    pub fn build_url(&self) -> String {
        if let Some(password) = &self.password {
            format!(
                "redis://:{}@{}:{}/{}",
                password, self.host, self.port, self.database
            )
        } else {
            format!("redis://{}:{}/{}", self.host, self.port, self.database)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: super::DatabaseConfig::default(),
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_url_with_and_without_password() {
        let config = RedisConfig::default();
        assert_eq!(config.build_url(), "redis://127.0.0.1:6379/0");

        let config = RedisConfig {
            password: Some("secret".to_string()),
            database: 3,
            ..RedisConfig::default()
        };
        assert_eq!(config.build_url(), "redis://:secret@127.0.0.1:6379/3");
    }

    #[test]
    fn app_config_parses_minimal_toml() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"
            max_connections = 5
            connect_timeout = 10

            [cache]
            cache_type = "memory"
            memory_max_entries = 1000
            default_ttl = 60
        "#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse config");
        assert!(matches!(config.cache.cache_type, CacheType::Memory));
        // 未出现的段落落回默认值
        assert!(config.rate_limit.default_rpm > 0);
        assert!(config.refresh.max_retries > 0);
    }
}
