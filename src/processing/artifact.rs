//! # 结果产物
//!
//! ## 设计思路
//!
//! 服务端返回的图片字节使用 `bytes::Bytes` 持有：克隆只增加引用计数，
//! 交给下游编辑器或生成下载文件时都不复制、不修改原始数据。

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// 外部处理服务生成的结果图片。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    bytes: Bytes,
    mime_type: String,
}

impl ResultArtifact {
    /// 构建产物。
    ///
    /// `declared_mime` 来自响应头；缺失或不是图片类型时按内容嗅探。
    pub fn new(bytes: Bytes, declared_mime: Option<&str>) -> Self {
        let declared = declared_mime
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase())
            .filter(|ct| ct.starts_with("image/"));

        let mime_type = declared
            .or_else(|| infer::get(&bytes).map(|kind| kind.mime_type().to_string()))
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

        Self { bytes, mime_type }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 可直接用于 `<img src>` 的 Data URL。
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// 读取图片头中的宽高；产物不是可识别的图片时返回 `None`。
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        image::ImageReader::new(std::io::Cursor::new(self.bytes.as_ref()))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}

/// 客户端下载文件：固定文件名 + 产物字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadableFile {
    pub file_name: &'static str,
    pub artifact: ResultArtifact,
}

impl DownloadableFile {
    /// 写入目标目录，返回最终路径。
    pub fn save_into(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name);
        std::fs::write(&path, self.artifact.bytes())?;
        log::info!("💾 结果已保存 - {} ({} bytes)", path.display(), self.artifact.len());
        Ok(path)
    }
}

/// 交给下游编辑器的导航状态。
///
/// 编辑器只拿到产物引用，自行绘制到自己的画布上。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorHandOff {
    pub image: ResultArtifact,
}

#[derive(Serialize)]
struct RouteState {
    image: String,
}

impl EditorHandOff {
    /// 序列化为路由状态 `{ "image": <data url> }`。
    pub fn to_route_state(&self) -> serde_json::Value {
        serde_json::to_value(RouteState {
            image: self.image.to_data_url(),
        })
        .unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn declared_content_type_wins_and_params_are_stripped() {
        let artifact = ResultArtifact::new(Bytes::from_static(b"abc"), Some("IMAGE/JPEG; q=1"));

        assert_eq!(artifact.mime_type(), "image/jpeg");
    }

    #[test]
    fn non_image_content_type_falls_back_to_sniffing() {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 13]);
        let artifact = ResultArtifact::new(Bytes::from(bytes), Some("application/octet-stream"));

        assert_eq!(artifact.mime_type(), "image/png");
    }

    #[test]
    fn unknown_payload_uses_octet_stream() {
        let artifact = ResultArtifact::new(Bytes::from_static(b"plain"), None);

        assert_eq!(artifact.mime_type(), FALLBACK_MIME_TYPE);
    }

    #[test]
    fn route_state_carries_data_url() {
        let hand_off = EditorHandOff {
            image: ResultArtifact::new(Bytes::from_static(b"hi"), Some("image/png")),
        };

        let state = hand_off.to_route_state();

        assert_eq!(state["image"], "data:image/png;base64,aGk=");
    }

    #[test]
    fn clones_share_the_same_buffer() {
        let artifact = ResultArtifact::new(Bytes::from(vec![1_u8; 64]), Some("image/png"));
        let cloned = artifact.clone();

        assert_eq!(artifact.bytes().as_ptr(), cloned.bytes().as_ptr());
    }
}
