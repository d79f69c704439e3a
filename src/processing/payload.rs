//! # 提交载荷
//!
//! 提交瞬间对源文件与遮罩做快照：之后画布继续被修改也不影响已发出的请求。

use bytes::Bytes;

use super::ProcessingFlow;

/// multipart 中的一个文件字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: &'static str,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// 一次提交的完整载荷（源文件 + 可选遮罩 + 可选任务 ID）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub request_id: u64,
    pub flow: ProcessingFlow,
    pub file: FilePart,
    pub mask: Option<FilePart>,
    pub job_id: Option<String>,
}

impl SubmissionPayload {
    /// 载荷总字节数（仅用于日志）。
    pub fn total_bytes(&self) -> usize {
        self.file.bytes.len() + self.mask.as_ref().map_or(0, |mask| mask.bytes.len())
    }
}
