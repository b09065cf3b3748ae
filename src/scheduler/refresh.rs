//! # 模型目录刷新服务
//!
//! 遍历活跃凭证，按TTL判定到期后经适配器拉取模型目录并入库。
//! 严格串行处理以约束对上游API的突发压力；单个凭证的失败只影响
//! 它自己的退避状态，从不中断整个周期。

use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::credentials::{CredentialStore, CredentialWithProvider};
use crate::error::{GatewayError, Result};
use crate::providers::AdapterRegistry;
use crate::registry::{ModelRegistry, ModelUpsert};
use crate::{
    ldebug, lerror, linfo, lwarn,
    logging::{LogComponent, LogStage},
};
use entity::provider_credentials;

use super::backoff::BackoffTracker;
use super::types::{CredentialRefreshOutcome, CycleStats, RefreshConfig};

/// 模型目录刷新服务
///
/// 退避状态映射由本服务独占；`cycle_running` 是廉价的内存标志，
/// 任何阻塞操作都不得影响它的判定
pub struct ModelRefreshService {
    registry: Arc<ModelRegistry>,
    credentials: Arc<dyn CredentialStore>,
    adapters: Arc<AdapterRegistry>,
    tracker: BackoffTracker,
    config: RefreshConfig,
    cycle_running: AtomicBool,
    cancel_requested: AtomicBool,
}

impl ModelRefreshService {
    /// 创建刷新服务
    #[must_use]
    pub fn new(
        registry: Arc<ModelRegistry>,
        credentials: Arc<dyn CredentialStore>,
        adapters: Arc<AdapterRegistry>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            registry,
            credentials,
            adapters,
            tracker: BackoffTracker::new(config.clone()),
            config,
            cycle_running: AtomicBool::new(false),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// 退避状态跟踪器
    #[must_use]
    pub fn tracker(&self) -> &BackoffTracker {
        &self.tracker
    }

    /// 刷新配置
    #[must_use]
    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// 请求中止当前周期：正在处理的凭证允许完成，队列其余部分放弃
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// 清除中止标志（任务启动时调用）
    pub fn reset_cancel(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }

    /// 凭证目录是否到期
    ///
    /// 从未同步过的凭证无条件到期；否则按提供商TTL（或默认TTL）判定
    #[must_use]
    pub fn needs_refresh(
        &self,
        credential: &provider_credentials::Model,
        provider_name: &str,
    ) -> bool {
        let Some(last_sync_at) = credential.last_sync_at else {
            return true;
        };

        let ttl = self.config.ttl_for_provider(provider_name);
        let elapsed = (Utc::now().naive_utc() - last_sync_at).num_seconds();
        elapsed >= i64::try_from(ttl).unwrap_or(i64::MAX)
    }

    /// 执行一个刷新周期
    ///
    /// 已有周期在进行时本次直接跳过（`ran = false`），不排队不重叠
    pub async fn process_refresh_cycle(&self) -> CycleStats {
        if self
            .cycle_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            lwarn!(
                "system",
                LogStage::Refresh,
                LogComponent::RefreshScheduler,
                "cycle_overlap",
                "上一个刷新周期仍在进行，跳过本次调度"
            );
            return CycleStats::default();
        }

        let stats = self.run_cycle().await;
        self.cycle_running.store(false, Ordering::SeqCst);
        stats
    }

    async fn run_cycle(&self) -> CycleStats {
        let mut stats = CycleStats {
            ran: true,
            ..CycleStats::default()
        };

        // 稳定顺序：按团队、优先级、凭证ID（由存储层保证）
        let active = match self.credentials.list_active_credentials().await {
            Ok(list) => list,
            Err(e) => {
                lerror!(
                    "system",
                    LogStage::Refresh,
                    LogComponent::RefreshScheduler,
                    "enumerate_failed",
                    "枚举活跃凭证失败，本周期放弃",
                    error = %e
                );
                return stats;
            }
        };

        let due: Vec<CredentialWithProvider> = active
            .into_iter()
            .filter(|entry| self.needs_refresh(&entry.credential, &entry.provider.name))
            .collect();
        stats.due = due.len();

        ldebug!(
            "system",
            LogStage::Refresh,
            LogComponent::RefreshScheduler,
            "cycle_start",
            &format!("刷新周期开始，共 {} 个到期凭证", stats.due)
        );

        // 严格串行：一次只打一个上游
        for entry in &due {
            if self.cancel_requested.load(Ordering::SeqCst) {
                stats.cancelled = true;
                linfo!(
                    "system",
                    LogStage::Refresh,
                    LogComponent::RefreshScheduler,
                    "cycle_cancelled",
                    "收到停止请求，放弃队列中剩余凭证"
                );
                break;
            }

            match self.refresh_credential(entry).await {
                CredentialRefreshOutcome::Refreshed(_) => stats.refreshed += 1,
                CredentialRefreshOutcome::Failed(_) => stats.failed += 1,
                CredentialRefreshOutcome::SkippedBackoff
                | CredentialRefreshOutcome::SkippedExhausted => stats.skipped += 1,
            }
        }

        linfo!(
            "system",
            LogStage::Refresh,
            LogComponent::RefreshScheduler,
            "cycle_done",
            &format!(
                "刷新周期结束: due={}, refreshed={}, failed={}, skipped={}",
                stats.due, stats.refreshed, stats.failed, stats.skipped
            )
        );
        stats
    }

    /// 刷新单个凭证的模型目录
    ///
    /// 退避窗口内或重试耗尽的凭证直接跳过；成功时入库并记录同步时间，
    /// 失败时只推进退避状态，绝不触碰 `last_sync_at`
    pub async fn refresh_credential(
        &self,
        entry: &CredentialWithProvider,
    ) -> CredentialRefreshOutcome {
        let credential_id = entry.credential.id;

        if self.tracker.is_exhausted(credential_id) {
            ldebug!(
                "system",
                LogStage::Refresh,
                LogComponent::RefreshScheduler,
                "skip_exhausted",
                &format!("凭证 {credential_id} 重试已耗尽，等待人工干预")
            );
            return CredentialRefreshOutcome::SkippedExhausted;
        }
        if self.tracker.is_in_backoff(credential_id) {
            ldebug!(
                "system",
                LogStage::Refresh,
                LogComponent::RefreshScheduler,
                "skip_backoff",
                &format!("凭证 {credential_id} 处于退避窗口")
            );
            return CredentialRefreshOutcome::SkippedBackoff;
        }

        let Some(adapter) = self.adapters.get(&entry.provider.name) else {
            return self
                .handle_failure(
                    credential_id,
                    &format!("提供商未注册适配器: {}", entry.provider.name),
                )
                .await;
        };

        match adapter.list_models(&entry.credential).await {
            Ok(discovered) => {
                let count = discovered.len();
                for model in discovered {
                    let upsert = ModelUpsert {
                        provider_model_id: model.native_id,
                        display_name: model.display_name,
                        description: None,
                        context_length: model.context_length,
                    };
                    if let Err(e) = self.registry.upsert_model(&entry.provider, &upsert).await {
                        return self
                            .handle_failure(credential_id, &format!("模型入库失败: {e}"))
                            .await;
                    }
                }

                let now = Utc::now().naive_utc();
                if let Err(e) = self.credentials.record_sync_success(credential_id, now).await {
                    lwarn!(
                        "system",
                        LogStage::Refresh,
                        LogComponent::RefreshScheduler,
                        "sync_bookkeeping_failed",
                        "同步时间写入失败，下个周期将重新刷新",
                        credential_id = credential_id,
                        error = %e
                    );
                }
                self.tracker.record_success(credential_id);

                linfo!(
                    "system",
                    LogStage::Refresh,
                    LogComponent::RefreshScheduler,
                    "credential_refreshed",
                    &format!(
                        "凭证 {credential_id} 刷新成功，{count} 个模型（提供商 {}）",
                        entry.provider.name
                    )
                );
                CredentialRefreshOutcome::Refreshed(count)
            }
            Err(e) => self.handle_failure(credential_id, &e.to_string()).await,
        }
    }

    /// 手动刷新：清空退避状态后立即尝试，无视当前退避窗口
    pub async fn refresh_provider(
        &self,
        team_id: i32,
        provider_name: &str,
    ) -> Result<CredentialRefreshOutcome> {
        let entry = self
            .credentials
            .get_credentials_by_team(team_id)
            .await?
            .into_iter()
            .find(|entry| {
                entry.provider.name == provider_name && entry.credential.is_usable()
            })
            .ok_or_else(|| {
                GatewayError::business(format!(
                    "团队 {team_id} 没有提供商 {provider_name} 的活跃凭证"
                ))
            })?;

        self.tracker.reset(entry.credential.id);
        Ok(self.refresh_credential(&entry).await)
    }

    /// 手动刷新团队的全部活跃凭证
    pub async fn refresh_all_providers(
        &self,
        team_id: i32,
    ) -> Result<Vec<(String, CredentialRefreshOutcome)>> {
        let mut results = Vec::new();
        for entry in self.credentials.get_credentials_by_team(team_id).await? {
            if !entry.credential.is_usable() {
                continue;
            }
            self.tracker.reset(entry.credential.id);
            let outcome = self.refresh_credential(&entry).await;
            results.push((entry.provider.name.clone(), outcome));
        }
        Ok(results)
    }

    async fn handle_failure(
        &self,
        credential_id: i32,
        message: &str,
    ) -> CredentialRefreshOutcome {
        let state = self.tracker.record_failure(credential_id, message);

        if let Err(e) = self.credentials.record_sync_error(credential_id, message).await {
            lwarn!(
                "system",
                LogStage::Refresh,
                LogComponent::RefreshScheduler,
                "error_bookkeeping_failed",
                "凭证错误信息写入失败",
                credential_id = credential_id,
                error = %e
            );
        }

        lwarn!(
            "system",
            LogStage::Refresh,
            LogComponent::RefreshScheduler,
            "credential_refresh_failed",
            &format!("凭证 {credential_id} 刷新失败: {message}"),
            retry_count = state.retry_count,
            next_retry_at = ?state.next_retry_at
        );
        CredentialRefreshOutcome::Failed(message.to_string())
    }
}
