//! # 单文件处理工作流
//!
//! 降噪、超分、MRI 重建共用的会话：上传一个文件，整体提交，拿回结果。
//! 没有画布也没有遮罩，请求生命周期与通知规则与遮罩编辑工作流一致。

use super::lifecycle::{RequestLifecycle, RequestState, WorkflowPhase};
use super::source::SourceImage;
use super::WorkflowError;
use crate::notification::{Notification, NotificationQueue};
use crate::processing::{
    DownloadableFile, EditorHandOff, FilePart, ProcessingClient, ProcessingError, ProcessingFlow,
    ResultArtifact, SubmissionPayload, generate_job_id,
};

#[derive(Debug)]
pub struct SingleFileWorkflow {
    flow: ProcessingFlow,
    source: Option<SourceImage>,
    job_id: Option<String>,
    lifecycle: RequestLifecycle,
    notifications: NotificationQueue,
}

impl SingleFileWorkflow {
    pub fn new(flow: ProcessingFlow) -> Self {
        Self {
            flow,
            source: None,
            job_id: None,
            lifecycle: RequestLifecycle::default(),
            notifications: NotificationQueue::new(),
        }
    }

    pub fn flow(&self) -> ProcessingFlow {
        self.flow
    }

    pub fn phase(&self) -> WorkflowPhase {
        if self.lifecycle.is_submitting() {
            return WorkflowPhase::Submitting;
        }
        if self.source.is_none() {
            return WorkflowPhase::Empty;
        }
        self.lifecycle
            .terminal_phase()
            .unwrap_or(WorkflowPhase::Loaded)
    }

    /// 上传源文件。只检查文件存在；MRI 额外要求 `.h5` 扩展名（区分大小写）。
    pub fn upload(&mut self, file: Option<SourceImage>) -> Result<(), WorkflowError> {
        if self.lifecycle.is_submitting() {
            let phase = self.phase();
            log::warn!("🚫 {:?} 阶段不允许 upload", phase);
            return Err(WorkflowError::InvalidPhase {
                operation: "upload",
                phase,
            });
        }

        let Some(source) = file else {
            self.notifications.error(self.flow.invalid_upload_message());
            return Err(WorkflowError::MissingFile);
        };

        if let Some(expected) = self.flow.required_extension() {
            if source.extension().as_deref() != Some(expected) {
                log::warn!("⚠️ {:?} 拒绝文件 {}：需要 .{}", self.flow, source.name(), expected);
                self.notifications.error(self.flow.invalid_upload_message());
                return Err(WorkflowError::UnsupportedFile {
                    expected,
                    file_name: source.name().to_string(),
                });
            }
        }

        log::info!(
            "📥 {:?} 已接收文件 - {} ({} bytes)",
            self.flow,
            source.name(),
            source.size()
        );
        self.source = Some(source);
        self.job_id = None;
        self.lifecycle.reset();
        self.notifications.success(self.flow.upload_success_message());
        Ok(())
    }

    /// 校验并生成提交快照。
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, WorkflowError> {
        if self.lifecycle.is_submitting() {
            log::debug!("⏳ 已有请求在处理中，忽略重复提交");
            return Err(WorkflowError::Busy);
        }
        if self.flow.requires_mask() {
            return Err(WorkflowError::MaskNotDrawn);
        }

        let Some(source) = self.source.as_ref() else {
            self.notifications.error(self.flow.missing_source_message());
            return Err(WorkflowError::NoSource);
        };

        let file = FilePart {
            field: self.flow.file_field(),
            file_name: source.name().to_string(),
            mime_type: source.mime_type().to_string(),
            bytes: source.bytes().clone(),
        };

        let request_id = self.lifecycle.begin()?;
        if let Some(estimate) = self.flow.estimate_message() {
            self.notifications.info(estimate);
        }
        let job_id = self.flow.sends_job_id().then(generate_job_id);
        self.job_id = job_id.clone();

        log::info!(
            "🚀 开始 {:?} 请求 #{} - {} bytes job_id={:?}",
            self.flow,
            request_id,
            file.bytes.len(),
            job_id
        );

        Ok(SubmissionPayload {
            request_id,
            flow: self.flow,
            file,
            mask: None,
            job_id,
        })
    }

    pub fn finish_submit(
        &mut self,
        request_id: u64,
        outcome: Result<ResultArtifact, ProcessingError>,
    ) -> WorkflowPhase {
        self.lifecycle
            .finish(request_id, outcome, self.flow, &mut self.notifications);
        self.phase()
    }

    pub async fn submit(&mut self, client: &ProcessingClient) -> Result<WorkflowPhase, WorkflowError> {
        let payload = self.begin_submit()?;
        let request_id = payload.request_id;
        let outcome = client.submit(payload).await;
        Ok(self.finish_submit(request_id, outcome))
    }

    /// 最近一次提交附带的任务 ID（仅超分流程）。
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn hand_off_to_editor(&self) -> Result<EditorHandOff, WorkflowError> {
        if !self.flow.supports_editor_hand_off() {
            return Err(WorkflowError::HandOffUnsupported(self.flow));
        }
        let artifact = self.succeeded_artifact("hand_off_to_editor")?;
        Ok(EditorHandOff {
            image: artifact.clone(),
        })
    }

    pub fn download_artifact(&self) -> Result<DownloadableFile, WorkflowError> {
        let artifact = self.succeeded_artifact("download_artifact")?;
        Ok(DownloadableFile {
            file_name: self.flow.download_file_name(),
            artifact: artifact.clone(),
        })
    }

    fn succeeded_artifact(&self, operation: &'static str) -> Result<&ResultArtifact, WorkflowError> {
        self.lifecycle.artifact().ok_or(WorkflowError::InvalidPhase {
            operation,
            phase: self.phase(),
        })
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn request_state(&self) -> &RequestState {
        self.lifecycle.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;
    use bytes::Bytes;

    fn artifact() -> ResultArtifact {
        ResultArtifact::new(Bytes::from_static(b"result"), Some("image/png"))
    }

    #[test]
    fn mri_rejects_non_h5_files() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::MriReconstruction);
        let file = SourceImage::new("scan.png", b"png".to_vec(), None);

        assert!(matches!(
            workflow.upload(Some(file)),
            Err(WorkflowError::UnsupportedFile { expected: "h5", .. })
        ));
        assert_eq!(workflow.phase(), WorkflowPhase::Empty);
        assert_eq!(workflow.take_notifications()[0].message, "Please upload a valid .h5 file.");
    }

    #[test]
    fn mri_extension_check_is_case_sensitive() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::MriReconstruction);

        assert!(matches!(
            workflow.upload(Some(SourceImage::new("KNEE.H5", b"\x89HDF".to_vec(), None))),
            Err(WorkflowError::UnsupportedFile { expected: "h5", .. })
        ));
        assert_eq!(workflow.phase(), WorkflowPhase::Empty);

        workflow
            .upload(Some(SourceImage::new("knee.h5", b"\x89HDF".to_vec(), None)))
            .expect("upload failed");

        let notes = workflow.take_notifications();
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(notes[1].kind, NotificationKind::Success);
        assert_eq!(notes[1].message, "HDF5 file uploaded successfully!");
    }

    #[test]
    fn mri_payload_uses_file_field() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::MriReconstruction);
        workflow
            .upload(Some(SourceImage::new("knee.h5", b"data".to_vec(), None)))
            .expect("upload failed");

        let payload = workflow.begin_submit().expect("begin_submit failed");

        assert_eq!(payload.file.field, "file");
        assert!(payload.mask.is_none());
        assert!(payload.job_id.is_none());
    }

    #[test]
    fn upscale_attaches_job_id() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::SuperResolution);
        workflow
            .upload(Some(SourceImage::new("small.png", b"png".to_vec(), None)))
            .expect("upload failed");

        let payload = workflow.begin_submit().expect("begin_submit failed");

        let job_id = payload.job_id.expect("job id missing");
        assert!(job_id.starts_with("img_"));
        assert_eq!(workflow.job_id(), Some(job_id.as_str()));
    }

    #[test]
    fn submit_without_file_notifies() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::MriReconstruction);

        assert_eq!(workflow.begin_submit(), Err(WorkflowError::NoSource));
        assert_eq!(workflow.take_notifications()[0].message, "Please upload an HDF5 file first.");
    }

    #[test]
    fn inpainting_cannot_run_without_mask() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::Inpainting);
        workflow
            .upload(Some(SourceImage::new("a.png", b"png".to_vec(), None)))
            .expect("upload failed");

        assert_eq!(workflow.begin_submit(), Err(WorkflowError::MaskNotDrawn));
        assert_eq!(workflow.phase(), WorkflowPhase::Loaded);
    }

    #[test]
    fn mri_result_downloads_but_never_hands_off() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::MriReconstruction);
        workflow
            .upload(Some(SourceImage::new("knee.h5", b"data".to_vec(), None)))
            .expect("upload failed");
        let payload = workflow.begin_submit().expect("begin_submit failed");

        assert_eq!(workflow.finish_submit(payload.request_id, Ok(artifact())), WorkflowPhase::Succeeded);
        assert_eq!(
            workflow.download_artifact().map(|file| file.file_name),
            Ok("mri-reconstruction.png")
        );
        assert_eq!(
            workflow.hand_off_to_editor(),
            Err(WorkflowError::HandOffUnsupported(ProcessingFlow::MriReconstruction))
        );
        assert_eq!(workflow.take_notifications().last().map(|n| n.message.clone()), Some("MRI processed successfully!".to_string()));
    }

    #[test]
    fn denoise_busy_then_failure() {
        let mut workflow = SingleFileWorkflow::new(ProcessingFlow::Denoising);
        workflow
            .upload(Some(SourceImage::new("noisy.png", b"png".to_vec(), None)))
            .expect("upload failed");
        let payload = workflow.begin_submit().expect("begin_submit failed");

        assert_eq!(workflow.begin_submit(), Err(WorkflowError::Busy));

        let phase = workflow.finish_submit(
            payload.request_id,
            Err(ProcessingError::Transport(String::new())),
        );
        assert_eq!(phase, WorkflowPhase::Failed);
        assert_eq!(
            workflow.take_notifications().last().map(|n| n.message.clone()),
            Some(crate::processing::GENERIC_FAILURE_MESSAGE.to_string())
        );
    }
}
