//! # 工作流错误模型
//!
//! 这里只承载“用户输入类”错误：操作被拒绝，请求不会发出，
//! 状态也不会迁移到 `Failed`。网络与服务端错误见 `processing::ProcessingError`。

use super::WorkflowPhase;
use crate::processing::ProcessingFlow;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// 上传事件没有携带文件。
    #[error("未选择文件")]
    MissingFile,

    /// 文件扩展名不符合流程要求（如 MRI 需要 `.h5`）。
    #[error("文件类型不符：需要 .{expected}，实际为 {file_name}")]
    UnsupportedFile {
        expected: &'static str,
        file_name: String,
    },

    /// 文件无法解码为图片。
    #[error("图片解码失败：{0}")]
    Decode(String),

    /// 提交时尚未上传源文件。
    #[error("尚未上传源文件")]
    NoSource,

    /// 遮罩全白，没有任何待修复区域。
    #[error("遮罩尚未绘制")]
    MaskNotDrawn,

    /// 已有请求在处理中。
    #[error("已有请求正在处理中")]
    Busy,

    /// 当前阶段不允许该操作。
    #[error("当前状态 {phase:?} 不允许执行 {operation}")]
    InvalidPhase {
        operation: &'static str,
        phase: WorkflowPhase,
    },

    /// 该流程的结果不能交给编辑器。
    #[error("{0:?} 的结果不支持交给编辑器")]
    HandOffUnsupported(ProcessingFlow),

    /// 遮罩导出为 PNG 失败。
    #[error("遮罩编码失败：{0}")]
    Encode(String),
}

impl WorkflowError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::UnsupportedFile { .. } => "unsupported_file",
            Self::Decode(_) => "decode",
            Self::NoSource => "no_source",
            Self::MaskNotDrawn => "mask_not_drawn",
            Self::Busy => "busy",
            Self::InvalidPhase { .. } => "invalid_phase",
            Self::HandOffUnsupported(_) => "hand_off_unsupported",
            Self::Encode(_) => "encode",
        }
    }
}
