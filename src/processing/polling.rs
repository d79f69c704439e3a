//! # 任务状态轮询
//!
//! ## 设计思路
//!
//! 异步任务模式下，服务端先受理任务，客户端再按 ID 查询状态。
//! 这里用“有上限的轮询”替代无限定时器，终态固定为三种：
//! `Completed` / `Failed` / `TimedOut`。
//!
//! 状态查询与结果拉取使用与提交相同的 `base_url`。

use serde::Deserialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use super::{ProcessingClient, ProcessingError, ProcessingFlow, ResultArtifact};
use crate::config::AppConfig;

const STATUS_CHECK_FAILED_MESSAGE: &str = "Failed to check processing status.";
const PROCESSING_FAILED_MESSAGE: &str = "Processing failed";

static JOB_COUNTER: AtomicU32 = AtomicU32::new(0);

/// 生成任务 ID：`img_<毫秒时间戳>_<序号>`。
pub fn generate_job_id() -> String {
    let seq = JOB_COUNTER.fetch_add(1, Ordering::Relaxed) % 1000;
    format!("img_{}_{}", chrono::Utc::now().timestamp_millis(), seq)
}

/// `GET /status/<id>` 的响应体。
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Completed,
    Failed,
}

impl JobStatus {
    /// 未识别的状态值一律视为仍在处理中。
    pub fn state(&self) -> JobState {
        match self.status.trim().to_ascii_lowercase().as_str() {
            "completed" => JobState::Completed,
            "failed" => JobState::Failed,
            _ => JobState::Pending,
        }
    }
}

/// 轮询终态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(ResultArtifact),
    Failed(String),
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn into_result(self) -> Result<ResultArtifact, ProcessingError> {
        match self {
            Self::Completed(artifact) => Ok(artifact),
            Self::Failed(message) => Err(ProcessingError::JobFailed(message)),
            Self::TimedOut { attempts } => Err(ProcessingError::TimedOut { attempts }),
        }
    }
}

impl ProcessingClient {
    /// 查询任务状态。
    pub async fn fetch_status(&self, job_id: &str) -> Result<JobStatus, ProcessingError> {
        let url = self.endpoint(&format!("status/{}", job_id));
        log::debug!("🔎 查询任务状态 - {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(ProcessingError::Server {
                status: response.status().as_u16(),
                message: STATUS_CHECK_FAILED_MESSAGE.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProcessingError::Transport(format!("读取状态响应失败：{}", e)))?;

        serde_json::from_slice::<JobStatus>(&body)
            .map_err(|e| ProcessingError::InvalidResponse(format!("状态响应解析失败：{}", e)))
    }

    /// 拉取已完成任务的结果图片。
    pub async fn fetch_job_artifact(
        &self,
        flow: ProcessingFlow,
        job_id: &str,
    ) -> Result<ResultArtifact, ProcessingError> {
        let mut url = reqwest::Url::parse(&self.endpoint(&format!("process-image/{}", flow.model_name())))
            .map_err(|e| ProcessingError::Request(format!("URL 格式错误：{}", e)))?;
        url.query_pairs_mut().append_pair("id", job_id);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        Self::read_artifact(response).await
    }
}

/// 有上限的状态轮询器。
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    max_attempts: u32,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.poll_max_attempts,
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 轮询直到终态或次数耗尽。
    pub async fn poll(
        &self,
        client: &ProcessingClient,
        flow: ProcessingFlow,
        job_id: &str,
    ) -> PollOutcome {
        for attempt in 1..=self.max_attempts {
            let status = match client.fetch_status(job_id).await {
                Ok(status) => status,
                Err(err) => {
                    log::warn!("⚠️ 任务 {} 状态查询失败（第 {} 次）：{}", job_id, attempt, err);
                    return PollOutcome::Failed(err.user_message());
                }
            };

            match status.state() {
                JobState::Completed => {
                    log::info!("✅ 任务 {} 已完成（第 {} 次查询）", job_id, attempt);
                    return match client.fetch_job_artifact(flow, job_id).await {
                        Ok(artifact) => PollOutcome::Completed(artifact),
                        Err(err) => PollOutcome::Failed(err.user_message()),
                    };
                }
                JobState::Failed => {
                    let message = status
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| PROCESSING_FAILED_MESSAGE.to_string());
                    return PollOutcome::Failed(message);
                }
                JobState::Pending => {
                    log::debug!("⏳ 任务 {} 处理中（{}/{}）", job_id, attempt, self.max_attempts);
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        log::warn!("⌛ 任务 {} 轮询超时（{} 次）", job_id, self.max_attempts);
        PollOutcome::TimedOut {
            attempts: self.max_attempts,
        }
    }
}
