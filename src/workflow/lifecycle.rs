//! # 请求生命周期
//!
//! ## 设计思路
//!
//! `Idle → Submitting → {Succeeded | Failed}`，`Failed`/`Succeeded` 后可再次提交。
//! 单飞约束由 `begin` 保证：处理中再次提交直接返回 `Busy`，不会产生第二个请求。
//! 没有取消、没有自动重试、没有超时。
//!
//! 每次提交分配递增的 `request_id`，`finish` 只接受当前在途请求的结果。

use serde::Serialize;

use super::WorkflowError;
use crate::notification::NotificationQueue;
use crate::processing::{ProcessingError, ProcessingFlow, ResultArtifact};

/// 对外展示的工作流阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Empty,
    Loaded,
    Drawing,
    Submitting,
    Succeeded,
    Failed,
}

/// 单个处理请求的状态。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Submitting {
        request_id: u64,
    },
    Succeeded {
        request_id: u64,
        artifact: ResultArtifact,
    },
    Failed {
        request_id: u64,
        message: String,
    },
}

#[derive(Debug, Default)]
pub struct RequestLifecycle {
    state: RequestState,
    next_request_id: u64,
}

impl RequestLifecycle {
    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, RequestState::Submitting { .. })
    }

    pub fn artifact(&self) -> Option<&ResultArtifact> {
        match &self.state {
            RequestState::Succeeded { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    /// 终态对应的阶段；`Idle` 与 `Submitting` 返回 `None`。
    pub fn terminal_phase(&self) -> Option<WorkflowPhase> {
        match self.state {
            RequestState::Succeeded { .. } => Some(WorkflowPhase::Succeeded),
            RequestState::Failed { .. } => Some(WorkflowPhase::Failed),
            _ => None,
        }
    }

    /// 进入 `Submitting`，返回新请求 ID。
    pub fn begin(&mut self) -> Result<u64, WorkflowError> {
        if self.is_submitting() {
            return Err(WorkflowError::Busy);
        }
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.state = RequestState::Submitting { request_id };
        Ok(request_id)
    }

    /// 记录请求结果并推送通知。
    ///
    /// 与当前在途请求不匹配的结果会被丢弃，返回 `false`。
    pub fn finish(
        &mut self,
        request_id: u64,
        outcome: Result<ResultArtifact, ProcessingError>,
        flow: ProcessingFlow,
        notifications: &mut NotificationQueue,
    ) -> bool {
        match self.state {
            RequestState::Submitting { request_id: current } if current == request_id => {}
            _ => {
                log::warn!("⚠️ 丢弃过期的请求结果 #{}（当前状态：{:?}）", request_id, self.state);
                return false;
            }
        }

        self.state = match outcome {
            Ok(artifact) => {
                notifications.success(flow.success_message());
                RequestState::Succeeded {
                    request_id,
                    artifact,
                }
            }
            Err(err) => {
                let message = err.user_message();
                log::warn!("❌ 请求 #{} 失败 [{}]：{}", request_id, err.code(), err);
                notifications.error(message.clone());
                RequestState::Failed {
                    request_id,
                    message,
                }
            }
        };
        true
    }

    /// 新会话开始时清空结果（在途请求不可清空）。
    pub fn reset(&mut self) {
        if !self.is_submitting() {
            self.state = RequestState::Idle;
        }
    }
}
