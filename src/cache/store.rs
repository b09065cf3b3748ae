//! # 计数器存储抽象层
//!
//! 提供统一的原子计数器接口，支持内存后端和Redis后端

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::error::Result;

/// 原子计数器存储接口
///
/// 速率限制与配额只依赖这里的语义：原子自增、TTL读取与设置。
/// 存储不可用时所有方法返回 `Err`，由调用方决定失败语义（限流侧 fail-closed）。
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// 原子自增并返回新值
    async fn incr(&self, key: &str, delta: i64) -> Result<i64>;

    /// 读取当前计数，键不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<i64>>;

    /// 读取键的剩余存活秒数；无过期时间返回 -1，键不存在返回 -2（Redis 语义）
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// 设置键的过期时间，键存在则返回 true
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// 存活探测
    async fn ping(&self) -> Result<()>;
}

/// 计数器条目
#[derive(Debug, Clone)]
struct CounterEntry {
    value: i64,
    expires_at: Option<Instant>,
}

impl CounterEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

/// 内存计数器实现，用于测试与单实例部署
#[derive(Default)]
pub struct MemoryCounterStore {
    data: RwLock<HashMap<String, CounterEntry>>,
}

impl MemoryCounterStore {
    /// 创建空的内存存储
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cleanup_expired(&self) {
        let mut data = self.data.write().unwrap();
        data.retain(|_, entry| !entry.is_expired());
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let mut data = self.data.write().unwrap();

        let entry = data.get(key).filter(|e| !e.is_expired());
        let new_value = entry.map_or(0, |e| e.value) + delta;
        let expires_at = entry.and_then(|e| e.expires_at);

        data.insert(
            key.to_string(),
            CounterEntry {
                value: new_value,
                expires_at,
            },
        );

        Ok(new_value)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>> {
        self.cleanup_expired();
        let data = self.data.read().unwrap();
        Ok(data
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value))
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        self.cleanup_expired();
        let data = self.data.read().unwrap();
        match data.get(key).filter(|e| !e.is_expired()) {
            None => Ok(-2),
            Some(entry) => match entry.expires_at {
                None => Ok(-1),
                Some(at) => {
                    let remaining = at.saturating_duration_since(Instant::now());
                    #[allow(clippy::cast_possible_wrap)]
                    let seconds = remaining.as_secs().max(1) as i64;
                    Ok(seconds)
                }
            },
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut data = self.data.write().unwrap();
        match data.get_mut(key).filter(|e| !e.is_expired()) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn incr_starts_from_zero() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.incr("k", 1).await.unwrap(), 1);
        assert_eq!(store.incr("k", 2).await.unwrap(), 3);
        assert_eq!(store.get("k").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn ttl_semantics_match_redis() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.ttl("missing").await.unwrap(), -2);

        store.incr("k", 1).await.unwrap();
        assert_eq!(store.ttl("k").await.unwrap(), -1);

        assert!(store.expire("k", Duration::from_secs(60)).await.unwrap());
        let ttl = store.ttl("k").await.unwrap();
        assert!(ttl > 0 && ttl <= 60);
    }

    #[tokio::test]
    async fn expired_entry_resets_counter() {
        let store = MemoryCounterStore::new();
        store.incr("k", 5).await.unwrap();
        store.expire("k", Duration::from_millis(10)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.incr("k", 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expire_on_missing_key_is_false() {
        let store = MemoryCounterStore::new();
        assert!(!store.expire("nope", Duration::from_secs(1)).await.unwrap());
    }
}
