//! # 缓存键命名规范
//!
//! 定义统一的计数器键生成策略

use serde::{Deserialize, Serialize};
use std::fmt;

/// 计数器键类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CacheKey {
    /// 速率限制计数 - `ratelimit:{api_key_id}`
    RateLimit { api_key_id: String },

    /// 项目配额累计用量 - `quota:{project_id}`
    Quota { project_id: String },

    /// 自定义键 - `custom:{prefix}:{key}`
    Custom { prefix: String, key: String },
}

impl CacheKey {
    /// 生成缓存键字符串
    #[must_use]
    pub fn build(&self) -> String {
        match self {
            Self::RateLimit { api_key_id } => {
                format!("ratelimit:{api_key_id}")
            }
            Self::Quota { project_id } => {
                format!("quota:{project_id}")
            }
            Self::Custom { prefix, key } => {
                format!("custom:{prefix}:{key}")
            }
        }
    }

    /// 获取缓存键的命名空间
    #[must_use]
    pub const fn namespace(&self) -> &'static str {
        match self {
            Self::RateLimit { .. } => "ratelimit",
            Self::Quota { .. } => "quota",
            Self::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_formats() {
        let key = CacheKey::RateLimit {
            api_key_id: "ak_123".to_string(),
        };
        assert_eq!(key.build(), "ratelimit:ak_123");
        assert_eq!(key.namespace(), "ratelimit");

        let key = CacheKey::Quota {
            project_id: "proj_9".to_string(),
        };
        assert_eq!(key.build(), "quota:proj_9");
        assert_eq!(key.to_string(), "quota:proj_9");
    }
}
