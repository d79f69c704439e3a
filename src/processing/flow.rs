//! # 处理流程描述
//!
//! 每种处理能力（修复 / 降噪 / 超分 / MRI 重建）对应一个 `ProcessingFlow`，
//! 集中描述它的接口路径、表单字段与下载文件名，避免这些常量散落在调用侧。

use serde::{Deserialize, Serialize};

use super::ProcessingError;

/// 外部处理服务支持的流程。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingFlow {
    /// 基于遮罩的局部重绘。
    Inpainting,
    Denoising,
    SuperResolution,
    /// HDF5 原始数据的 MRI 重建。
    MriReconstruction,
}

impl ProcessingFlow {
    /// 提交接口相对路径（拼接在 `base_url` 之后）。
    pub fn endpoint_path(self) -> &'static str {
        match self {
            Self::Inpainting => "inpaint",
            Self::Denoising => "denoise",
            Self::SuperResolution => "upscale",
            Self::MriReconstruction => "mri",
        }
    }

    /// 承载源文件的 multipart 字段名。
    pub fn file_field(self) -> &'static str {
        match self {
            Self::MriReconstruction => "file",
            _ => "image",
        }
    }

    /// 结果下载时使用的固定文件名。
    pub fn download_file_name(self) -> &'static str {
        match self {
            Self::Inpainting => "inpainted-image.png",
            Self::Denoising => "denoised_image.png",
            Self::SuperResolution => "improved-image.png",
            Self::MriReconstruction => "mri-reconstruction.png",
        }
    }

    /// 状态轮询与结果拉取时使用的模型名。
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Inpainting => "inpainting",
            Self::Denoising => "denoising",
            Self::SuperResolution => "superresolution",
            Self::MriReconstruction => "mri",
        }
    }

    pub fn requires_mask(self) -> bool {
        matches!(self, Self::Inpainting)
    }

    /// 是否随请求附带任务 ID 字段（`id`）。
    pub fn sends_job_id(self) -> bool {
        matches!(self, Self::SuperResolution)
    }

    /// 结果能否交给下游编辑器继续处理。
    pub fn supports_editor_hand_off(self) -> bool {
        !matches!(self, Self::MriReconstruction)
    }

    /// 上传文件要求的扩展名（小写，不含点）。`None` 表示只要求文件存在。
    pub fn required_extension(self) -> Option<&'static str> {
        match self {
            Self::MriReconstruction => Some("h5"),
            _ => None,
        }
    }

    /// 上传成功时的提示文案。
    pub fn upload_success_message(self) -> &'static str {
        match self {
            Self::MriReconstruction => "HDF5 file uploaded successfully!",
            _ => "Image uploaded successfully!",
        }
    }

    /// 上传事件没有文件或文件不合规时的提示文案。
    pub fn invalid_upload_message(self) -> &'static str {
        match self {
            Self::MriReconstruction => "Please upload a valid .h5 file.",
            _ => "Failed to upload image. Please try again.",
        }
    }

    /// 处理成功时的提示文案。
    pub fn success_message(self) -> &'static str {
        match self {
            Self::MriReconstruction => "MRI processed successfully!",
            _ => "Processing complete!",
        }
    }

    /// 未上传文件就提交时的提示文案。
    pub fn missing_source_message(self) -> &'static str {
        match self {
            Self::MriReconstruction => "Please upload an HDF5 file first.",
            _ => "Please upload an image first.",
        }
    }

    /// 提交后提示的预计处理时长（秒）。服务端不提供估算，使用固定值。
    pub fn estimated_seconds(self) -> Option<u64> {
        match self {
            Self::Inpainting | Self::SuperResolution => Some(30),
            _ => None,
        }
    }

    /// 预计时长提示文案，格式 `mm:ss`。
    pub fn estimate_message(self) -> Option<String> {
        self.estimated_seconds().map(|secs| {
            format!("Estimated time for processing: {:02}:{:02}", secs / 60, secs % 60)
        })
    }

    /// 从命令行/配置字符串解析流程。
    pub fn parse(value: &str) -> Result<Self, ProcessingError> {
        match value.trim().to_lowercase().as_str() {
            "inpaint" | "inpainting" => Ok(Self::Inpainting),
            "denoise" | "denoising" => Ok(Self::Denoising),
            "upscale" | "superresolution" | "super_resolution" => Ok(Self::SuperResolution),
            "mri" | "mri_reconstruction" => Ok(Self::MriReconstruction),
            other => Err(ProcessingError::Request(format!(
                "未知处理流程：{}（可选：inpaint / denoise / upscale / mri）",
                other
            ))),
        }
    }
}
