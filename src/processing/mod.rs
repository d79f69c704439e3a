//! # 外部处理服务模块（processing）
//!
//! ## 设计思路
//!
//! 把“与外部推理服务通信”从工作流状态机中剥离出来：
//! 工作流只负责产出一次性快照（`SubmissionPayload`），并消费结果（`ResultArtifact`）；
//! 网络细节全部收敛在本模块。
//!
//! - `flow`：各处理流程的接口路径、字段名、下载文件名
//! - `payload`：提交快照
//! - `client`：multipart 提交与响应解析
//! - `polling`：异步任务状态轮询（有上限，三种终态）
//! - `artifact`：结果产物、下载文件、编辑器交接
//! - `error`：统一错误类型
//!
//! ## 调用链
//!
//! ```text
//! MaskEditWorkflow::begin_submit()
//!    ↓ SubmissionPayload
//! ProcessingClient::submit()  ── POST <base>/<flow>
//!    ↓ Result<ResultArtifact, ProcessingError>
//! MaskEditWorkflow::finish_submit()
//! ```

mod artifact;
mod client;
mod error;
mod flow;
mod payload;
mod polling;

pub use artifact::{DownloadableFile, EditorHandOff, ResultArtifact};
pub use client::ProcessingClient;
pub use error::{GENERIC_FAILURE_MESSAGE, ProcessingError, TIMED_OUT_MESSAGE};
pub use flow::ProcessingFlow;
pub use payload::{FilePart, SubmissionPayload};
pub use polling::{JobState, JobStatus, PollOutcome, StatusPoller, generate_job_id};
