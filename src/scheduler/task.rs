//! # 模型刷新后台任务
//!
//! 长生命周期对象：进程启动时构造一次，由持有方启动/停止，没有全局单例。
//! 生命周期 stopped → running → stopped；`start`/`stop` 都是幂等的。

use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::error::Result;
use crate::{
    ldebug, linfo, lwarn,
    logging::{LogComponent, LogStage},
};

use super::refresh::ModelRefreshService;
use super::types::{TaskControl, TaskState};

/// 模型刷新后台任务
pub struct ModelRefreshTask {
    service: Arc<ModelRefreshService>,

    /// 任务状态
    task_state: Arc<RwLock<TaskState>>,

    /// 控制信号发送器
    control_sender: broadcast::Sender<TaskControl>,

    /// 任务句柄
    task_handle: Arc<RwLock<Option<JoinHandle<()>>>>,
}

impl ModelRefreshTask {
    /// 创建后台任务
    #[must_use]
    pub fn new(service: Arc<ModelRefreshService>) -> Self {
        let (control_sender, _) = broadcast::channel(8);

        Self {
            service,
            task_state: Arc::new(RwLock::new(TaskState::NotStarted)),
            control_sender,
            task_handle: Arc::new(RwLock::new(None)),
        }
    }

    /// 启动后台循环：立即执行一个周期，之后按固定间隔调度
    ///
    /// 重复调用是无害的空操作（记录警告）
    pub async fn start(&self) -> Result<()> {
        let mut state = self.task_state.write().await;

        if matches!(*state, TaskState::Running) {
            lwarn!(
                "system",
                LogStage::Startup,
                LogComponent::RefreshScheduler,
                "already_running",
                "刷新任务已在运行，忽略重复启动"
            );
            return Ok(());
        }

        *state = TaskState::Running;
        self.service.reset_cancel();

        let handle = self.spawn_task_loop();
        *self.task_handle.write().await = Some(handle);

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::RefreshScheduler,
            "task_started",
            &format!(
                "模型刷新任务已启动，调度间隔 {} 秒",
                self.service.config().tick_interval_seconds
            )
        );
        Ok(())
    }

    /// 停止后台循环
    ///
    /// 协作式取消：正在处理的凭证允许完成，队列其余部分放弃。
    /// 对未启动/已停止的任务调用是无害的空操作。
    pub async fn stop(&self) -> Result<()> {
        {
            let mut state = self.task_state.write().await;

            if !matches!(*state, TaskState::Running) {
                lwarn!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::RefreshScheduler,
                    "not_running",
                    "刷新任务未在运行，忽略停止请求"
                );
                return Ok(());
            }

            *state = TaskState::Stopping;
        }

        // 状态锁已释放：循环在收尾时还要读它
        self.service.request_cancel();
        let _ = self.control_sender.send(TaskControl::Stop);

        if let Some(handle) = self.task_handle.write().await.take() {
            let _ = handle.await;
        }

        *self.task_state.write().await = TaskState::Stopped;
        linfo!(
            "system",
            LogStage::Shutdown,
            LogComponent::RefreshScheduler,
            "task_stopped",
            "模型刷新任务已停止"
        );
        Ok(())
    }

    /// 触发一次立即刷新（不等待下个tick）
    pub fn execute_now(&self) {
        let _ = self.control_sender.send(TaskControl::ExecuteNow);
    }

    /// 当前任务状态
    pub async fn state(&self) -> TaskState {
        *self.task_state.read().await
    }

    /// 刷新服务句柄（手动刷新等操作复用同一套原语）
    #[must_use]
    pub fn service(&self) -> &Arc<ModelRefreshService> {
        &self.service
    }

    fn spawn_task_loop(&self) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        let task_state = Arc::clone(&self.task_state);
        let mut control_receiver = self.control_sender.subscribe();
        let tick_seconds = service.config().tick_interval_seconds;

        tokio::spawn(async move {
            let mut ticker = interval(StdDuration::from_secs(tick_seconds.max(1)));

            linfo!(
                "system",
                LogStage::Refresh,
                LogComponent::RefreshScheduler,
                "loop_started",
                "模型刷新循环已启动"
            );

            loop {
                tokio::select! {
                    // 第一个tick立即触发，对应启动即刷新
                    _ = ticker.tick() => {
                        let current_state = { *task_state.read().await };
                        match current_state {
                            TaskState::Running => {
                                let stats = service.process_refresh_cycle().await;
                                ldebug!(
                                    "system",
                                    LogStage::Refresh,
                                    LogComponent::RefreshScheduler,
                                    "tick_done",
                                    &format!(
                                        "调度tick完成: ran={}, refreshed={}, failed={}",
                                        stats.ran, stats.refreshed, stats.failed
                                    )
                                );
                            }
                            TaskState::Stopping | TaskState::Stopped => break,
                            TaskState::NotStarted => {}
                        }
                    },

                    Ok(control) = control_receiver.recv() => {
                        match control {
                            TaskControl::Stop => {
                                ldebug!(
                                    "system",
                                    LogStage::Shutdown,
                                    LogComponent::RefreshScheduler,
                                    "stop_signal",
                                    "收到停止信号，退出刷新循环"
                                );
                                break;
                            }
                            TaskControl::ExecuteNow => {
                                let stats = service.process_refresh_cycle().await;
                                linfo!(
                                    "system",
                                    LogStage::Refresh,
                                    LogComponent::RefreshScheduler,
                                    "execute_now_done",
                                    &format!(
                                        "立即刷新完成: refreshed={}, failed={}",
                                        stats.refreshed, stats.failed
                                    )
                                );
                            }
                        }
                    }
                }
            }

            linfo!(
                "system",
                LogStage::Refresh,
                LogComponent::RefreshScheduler,
                "loop_ended",
                "模型刷新循环已退出"
            );
        })
    }
}
