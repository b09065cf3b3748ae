//! # 项目Token配额服务
//!
//! 累计token预算门控：`check` 是纯预检，不改状态；`consume` 在请求完成、
//! 实际token数已知后调用一次。两者分离意味着并发请求可能同时通过预检
//! （check-then-act竞态），该语义与整体一致性要求相符并记录在设计文档。

use std::sync::Arc;

use crate::cache::{CacheKey, CounterStore};
use crate::{
    ldebug, lwarn,
    logging::{LogComponent, LogStage},
};

use super::types::QuotaOutcome;

/// 配额服务（按项目维度）
pub struct QuotaService {
    store: Arc<dyn CounterStore>,
}

impl QuotaService {
    /// 创建配额服务实例
    #[must_use]
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// 配额预检
    ///
    /// `quota` 为空表示无限配额：恒为放行，`remaining`/`limit` 为空。
    /// 有配额时按 `当前用量 + 待消耗 <= 配额` 判定；存储不可用时拒绝
    /// （fail-closed），与速率限制器保持同一失败语义。
    pub async fn check(
        &self,
        project_id: &str,
        tokens_to_consume: i64,
        quota: Option<i64>,
    ) -> QuotaOutcome {
        let Some(quota) = quota else {
            return QuotaOutcome {
                allowed: true,
                remaining: None,
                used: self.current_usage(project_id).await.unwrap_or(0),
                limit: None,
            };
        };

        let used = match self.current_usage(project_id).await {
            Ok(used) => used,
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::Quota,
                    LogComponent::Quota,
                    "store_unavailable",
                    "计数器存储不可用，配额检查按拒绝处理",
                    project_id = project_id,
                    error = %e
                );
                return QuotaOutcome {
                    allowed: false,
                    remaining: Some(0),
                    used: 0,
                    limit: Some(quota),
                };
            }
        };

        let allowed = used + tokens_to_consume <= quota;
        QuotaOutcome {
            allowed,
            remaining: Some((quota - used).max(0)),
            used,
            limit: Some(quota),
        }
    }

    /// 计入实际消耗的token数
    ///
    /// 请求完成后调用一次。存储不可用时静默放弃：少记用量比在热路径
    /// 上阻塞一次非关键写入更可取。
    pub async fn consume(&self, project_id: &str, tokens: i64) {
        if tokens <= 0 {
            return;
        }

        let key = CacheKey::Quota {
            project_id: project_id.to_string(),
        }
        .build();

        match self.store.incr(&key, tokens).await {
            Ok(total) => {
                ldebug!(
                    "system",
                    LogStage::Quota,
                    LogComponent::Quota,
                    "consume",
                    &format!("配额消耗: project={project_id}, tokens={tokens}, total={total}")
                );
            }
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::Quota,
                    LogComponent::Quota,
                    "consume_dropped",
                    "计数器存储不可用，本次用量未入账",
                    project_id = project_id,
                    tokens = tokens,
                    error = %e
                );
            }
        }
    }

    async fn current_usage(&self, project_id: &str) -> crate::error::Result<i64> {
        let key = CacheKey::Quota {
            project_id: project_id.to_string(),
        }
        .build();
        Ok(self.store.get(&key).await?.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCounterStore;
    use crate::testing::mocks::FailingCounterStore;

    #[tokio::test]
    async fn unlimited_quota_always_allows() {
        let quota = QuotaService::new(Arc::new(MemoryCounterStore::new()));

        let outcome = quota.check("proj", i64::MAX / 2, None).await;
        assert!(outcome.allowed);
        assert_eq!(outcome.remaining, None);
        assert_eq!(outcome.limit, None);
    }

    #[tokio::test]
    async fn boundary_at_exact_quota() {
        let quota = QuotaService::new(Arc::new(MemoryCounterStore::new()));

        // 用量推到恰好等于配额
        quota.consume("proj", 100).await;

        let outcome = quota.check("proj", 1, Some(100)).await;
        assert!(!outcome.allowed);
        assert_eq!(outcome.remaining, Some(0));
        assert_eq!(outcome.used, 100);
        assert_eq!(outcome.limit, Some(100));

        // 零消耗的检查仍然放行
        let outcome = quota.check("proj", 0, Some(100)).await;
        assert!(outcome.allowed);
    }

    #[tokio::test]
    async fn check_is_a_pure_precheck() {
        let quota = QuotaService::new(Arc::new(MemoryCounterStore::new()));

        for _ in 0..5 {
            let outcome = quota.check("proj", 10, Some(100)).await;
            assert!(outcome.allowed);
            // check 不改变用量
            assert_eq!(outcome.used, 0);
        }

        quota.consume("proj", 10).await;
        let outcome = quota.check("proj", 10, Some(100)).await;
        assert_eq!(outcome.used, 10);
        assert_eq!(outcome.remaining, Some(90));
    }

    #[tokio::test]
    async fn store_outage_fails_closed() {
        let quota = QuotaService::new(Arc::new(FailingCounterStore));

        let outcome = quota.check("proj", 1, Some(1_000_000)).await;
        assert!(!outcome.allowed);
        assert_eq!(outcome.remaining, Some(0));
    }

    #[tokio::test]
    async fn consume_is_silent_on_store_outage() {
        let quota = QuotaService::new(Arc::new(FailingCounterStore));
        // 不 panic、不报错，仅丢弃
        quota.consume("proj", 42).await;
    }

    #[tokio::test]
    async fn consume_ignores_non_positive_tokens() {
        let store = Arc::new(MemoryCounterStore::new());
        let quota = QuotaService::new(Arc::clone(&store) as Arc<dyn CounterStore>);

        quota.consume("proj", 0).await;
        quota.consume("proj", -5).await;
        assert_eq!(quota.check("proj", 1, Some(10)).await.used, 0);
    }
}
