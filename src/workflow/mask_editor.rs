//! # 遮罩编辑工作流
//!
//! ## 设计思路
//!
//! 一个 `MaskEditWorkflow` 对应一次编辑会话：上传源图 → 在画布上涂抹遮罩 → 提交修复。
//!
//! ```text
//! Empty ──upload──▶ Loaded ⇄ Drawing
//!                     │
//!                   submit
//!                     ▼
//!                Submitting ──▶ Succeeded | Failed（均可继续编辑、再次提交）
//! ```
//!
//! - 工作流由调用方独占（`&mut self`），不需要锁。
//! - 提交拆成 `begin_submit`（校验 + 快照，同步）与 `finish_submit`（记录结果），
//!   调用方可以在请求进行中继续派发事件；`submit` 把两步串起来。
//! - 用户输入类错误只产生通知，不发请求，也不进入 `Failed`。

use super::canvas::CanvasPair;
use super::lifecycle::{RequestLifecycle, RequestState, WorkflowPhase};
use super::source::SourceImage;
use super::stroke::{DrawingSession, StrokeWidth, paint_segment};
use super::WorkflowError;
use crate::config::AppConfig;
use crate::notification::{Notification, NotificationQueue};
use crate::processing::{
    DownloadableFile, EditorHandOff, FilePart, ProcessingClient, ProcessingError, ProcessingFlow,
    ResultArtifact, SubmissionPayload,
};

const FLOW: ProcessingFlow = ProcessingFlow::Inpainting;

const MASK_FIELD: &str = "mask";
const MASK_FILE_NAME: &str = "mask.png";
const MASK_MIME_TYPE: &str = "image/png";

const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload image. Please try again.";
const MASK_MISSING_MESSAGE: &str = "Please draw a mask on the image first.";

/// 遮罩编辑 + 修复提交的会话状态机。
#[derive(Debug)]
pub struct MaskEditWorkflow {
    max_display_width: u32,
    source: Option<SourceImage>,
    canvases: Option<CanvasPair>,
    drawing: DrawingSession,
    lifecycle: RequestLifecycle,
    notifications: NotificationQueue,
}

impl MaskEditWorkflow {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            max_display_width: config.max_display_width.max(1),
            source: None,
            canvases: None,
            drawing: DrawingSession::new(StrokeWidth::clamped(config.default_stroke_width)),
            lifecycle: RequestLifecycle::default(),
            notifications: NotificationQueue::new(),
        }
    }

    /// 当前阶段。
    pub fn phase(&self) -> WorkflowPhase {
        if self.lifecycle.is_submitting() {
            return WorkflowPhase::Submitting;
        }
        if self.canvases.is_none() {
            return WorkflowPhase::Empty;
        }
        if self.drawing.is_drawing() {
            return WorkflowPhase::Drawing;
        }
        self.lifecycle
            .terminal_phase()
            .unwrap_or(WorkflowPhase::Loaded)
    }

    /// 上传源图。解码在阻塞线程池中执行。
    ///
    /// 成功后替换整个会话（画布、笔画、上一次结果）。
    pub async fn upload(&mut self, file: Option<SourceImage>) -> Result<(), WorkflowError> {
        let source = self.accept_upload(file)?;

        let bytes = source.bytes().clone();
        let max_width = self.max_display_width;
        let decoded = tokio::task::spawn_blocking(move || CanvasPair::from_encoded(&bytes, max_width))
            .await
            .map_err(|e| WorkflowError::Decode(format!("解码任务异常退出：{}", e)))
            .and_then(|result| result);

        self.install(source, decoded)
    }

    /// 同步版本的上传，供没有运行时的调用方使用。
    pub fn upload_blocking(&mut self, file: Option<SourceImage>) -> Result<(), WorkflowError> {
        let source = self.accept_upload(file)?;
        let decoded = CanvasPair::from_encoded(source.bytes(), self.max_display_width);
        self.install(source, decoded)
    }

    fn accept_upload(&mut self, file: Option<SourceImage>) -> Result<SourceImage, WorkflowError> {
        if self.lifecycle.is_submitting() {
            return Err(self.reject("upload"));
        }

        match file {
            Some(source) => {
                log::debug!(
                    "📥 收到上传文件 - {} ({} bytes, {})",
                    source.name(),
                    source.size(),
                    source.mime_type()
                );
                Ok(source)
            }
            None => {
                self.notifications.error(UPLOAD_FAILED_MESSAGE);
                Err(WorkflowError::MissingFile)
            }
        }
    }

    fn install(
        &mut self,
        source: SourceImage,
        decoded: Result<CanvasPair, WorkflowError>,
    ) -> Result<(), WorkflowError> {
        let canvases = match decoded {
            Ok(canvases) => canvases,
            Err(err) => {
                log::warn!("⚠️ 源图 {} 解码失败：{}", source.name(), err);
                self.notifications.error(UPLOAD_FAILED_MESSAGE);
                return Err(err);
            }
        };

        log::info!(
            "📷 源图已加载 - {} 画布 {:?}",
            source.name(),
            canvases.dimensions()
        );

        self.source = Some(source);
        self.canvases = Some(canvases);
        self.drawing.end();
        self.lifecycle.reset();
        self.notifications.success(FLOW.upload_success_message());
        Ok(())
    }

    /// 按下：开始一条新路径。
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<(), WorkflowError> {
        if self.lifecycle.is_submitting() || self.canvases.is_none() {
            return Err(self.reject("pointer_down"));
        }
        log::debug!("🖱️ pointer_down ({:.1}, {:.1})", x, y);
        self.drawing.begin(x, y);
        Ok(())
    }

    /// 移动：绘制中则延伸路径，返回遮罩是否有像素被涂上。
    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        let Some(canvases) = self.canvases.as_mut() else {
            return false;
        };
        let width = self.drawing.width();
        match self.drawing.extend(x, y) {
            Some((from, to)) => paint_segment(canvases, from, to, width),
            None => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.drawing.end();
    }

    pub fn pointer_leave(&mut self) {
        self.drawing.end();
    }

    /// 设置笔刷宽度，只影响之后的笔画。
    pub fn set_stroke_width(&mut self, value: i64) -> StrokeWidth {
        let width = StrokeWidth::clamped(value);
        if width.get() as i64 != value {
            log::debug!("✏️ 笔刷宽度 {} 已夹到 {}", value, width.get());
        }
        self.drawing.set_width(width);
        width
    }

    pub fn stroke_width(&self) -> StrokeWidth {
        self.drawing.width()
    }

    pub fn is_mask_drawn(&self) -> bool {
        self.canvases
            .as_ref()
            .is_some_and(CanvasPair::is_mask_drawn)
    }

    /// 校验并生成提交快照，进入 `Submitting`。
    ///
    /// 处理中重复提交返回 `Busy`，不产生通知也不产生请求。
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, WorkflowError> {
        if self.lifecycle.is_submitting() {
            log::debug!("⏳ 已有请求在处理中，忽略重复提交");
            return Err(WorkflowError::Busy);
        }
        if self.drawing.is_drawing() {
            return Err(self.reject("submit"));
        }

        let Some(source) = self.source.as_ref() else {
            self.notifications.error(FLOW.missing_source_message());
            return Err(WorkflowError::NoSource);
        };
        let Some(canvases) = self.canvases.as_ref() else {
            self.notifications.error(FLOW.missing_source_message());
            return Err(WorkflowError::NoSource);
        };
        if !canvases.is_mask_drawn() {
            self.notifications.error(MASK_MISSING_MESSAGE);
            return Err(WorkflowError::MaskNotDrawn);
        }

        let mask = match canvases.mask_png() {
            Ok(mask) => mask,
            Err(err) => {
                log::warn!("⚠️ 遮罩导出失败：{}", err);
                self.notifications.error(crate::processing::GENERIC_FAILURE_MESSAGE);
                return Err(err);
            }
        };

        let file = FilePart {
            field: FLOW.file_field(),
            file_name: source.name().to_string(),
            mime_type: source.mime_type().to_string(),
            bytes: source.bytes().clone(),
        };
        let mask = FilePart {
            field: MASK_FIELD,
            file_name: MASK_FILE_NAME.to_string(),
            mime_type: MASK_MIME_TYPE.to_string(),
            bytes: mask,
        };

        let request_id = self.lifecycle.begin()?;
        if let Some(estimate) = FLOW.estimate_message() {
            self.notifications.info(estimate);
        }
        log::info!(
            "🚀 开始修复请求 #{} - 源图 {} bytes, 遮罩 {} bytes",
            request_id,
            file.bytes.len(),
            mask.bytes.len()
        );

        Ok(SubmissionPayload {
            request_id,
            flow: FLOW,
            file,
            mask: Some(mask),
            job_id: None,
        })
    }

    /// 记录请求结果，返回之后的阶段。
    pub fn finish_submit(
        &mut self,
        request_id: u64,
        outcome: Result<ResultArtifact, ProcessingError>,
    ) -> WorkflowPhase {
        self.lifecycle
            .finish(request_id, outcome, FLOW, &mut self.notifications);
        self.phase()
    }

    /// 提交并等待结果。
    pub async fn submit(&mut self, client: &ProcessingClient) -> Result<WorkflowPhase, WorkflowError> {
        let payload = self.begin_submit()?;
        let request_id = payload.request_id;
        let outcome = client.submit(payload).await;
        Ok(self.finish_submit(request_id, outcome))
    }

    /// 把结果交给下游编辑器。仅 `Succeeded` 可用。
    pub fn hand_off_to_editor(&self) -> Result<EditorHandOff, WorkflowError> {
        let artifact = self.succeeded_artifact("hand_off_to_editor")?;
        Ok(EditorHandOff {
            image: artifact.clone(),
        })
    }

    /// 以固定文件名导出结果。仅 `Succeeded` 可用。
    pub fn download_artifact(&self) -> Result<DownloadableFile, WorkflowError> {
        let artifact = self.succeeded_artifact("download_artifact")?;
        Ok(DownloadableFile {
            file_name: FLOW.download_file_name(),
            artifact: artifact.clone(),
        })
    }

    fn succeeded_artifact(&self, operation: &'static str) -> Result<&ResultArtifact, WorkflowError> {
        self.lifecycle.artifact().ok_or(WorkflowError::InvalidPhase {
            operation,
            phase: self.phase(),
        })
    }

    fn reject(&self, operation: &'static str) -> WorkflowError {
        let phase = self.phase();
        log::warn!("🚫 {:?} 阶段不允许 {}", phase, operation);
        WorkflowError::InvalidPhase { operation, phase }
    }

    /// 取出待展示通知。
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn canvases(&self) -> Option<&CanvasPair> {
        self.canvases.as_ref()
    }

    pub fn request_state(&self) -> &RequestState {
        self.lifecycle.state()
    }
}
