//! # 源文件模型
//!
//! 用户通过文件选择器或拖放提交的文件。整个编辑会话内只读，
//! 重新上传时整体替换；提交时发送的永远是这里的原始字节。

use bytes::Bytes;
use std::path::Path;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// 一次会话的源文件（字节 + 元数据）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    mime_type: String,
    bytes: Bytes,
}

impl SourceImage {
    /// 由调用方提供的文件构建。
    ///
    /// `mime_type` 缺失时按内容嗅探，嗅探失败记为 `application/octet-stream`。
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>, mime_type: Option<&str>) -> Self {
        let bytes = bytes.into();
        let mime_type = mime_type
            .map(|mime| mime.trim().to_string())
            .filter(|mime| !mime.is_empty())
            .or_else(|| infer::get(&bytes).map(|kind| kind.mime_type().to_string()))
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

        Self {
            name: name.into(),
            mime_type,
            bytes,
        }
    }

    /// 从本地路径读取。
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, bytes, None))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// 扩展名（不含点），保留原始大小写。
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_is_sniffed_when_missing() {
        let png = [137_u8, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13];
        let source = SourceImage::new("photo", png.to_vec(), None);

        assert_eq!(source.mime_type(), "image/png");
        assert_eq!(source.size(), png.len());
    }

    #[test]
    fn declared_mime_is_kept_verbatim() {
        let source = SourceImage::new("scan.h5", b"\x89HDF".to_vec(), Some("application/x-hdf5"));

        assert_eq!(source.mime_type(), "application/x-hdf5");
        assert_eq!(source.extension().as_deref(), Some("h5"));
    }

    #[test]
    fn unknown_content_falls_back_to_octet_stream() {
        let source = SourceImage::new("notes.TXT", b"hello".to_vec(), Some("  "));

        assert_eq!(source.mime_type(), FALLBACK_MIME_TYPE);
        assert_eq!(source.extension().as_deref(), Some("TXT"));
    }
}
