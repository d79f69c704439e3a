//! # 画布对（显示画布 + 遮罩画布）
//!
//! ## 设计思路
//!
//! 两块像素缓冲总是成对出现、尺寸相同，由 `CanvasPair` 独占持有，
//! 绘制与导出都显式传入，不存在全局画布句柄。
//!
//! - 显示画布：源图按宽度上限等比缩小后的副本，笔画以半透明叠加色绘制
//! - 遮罩画布：加载时整块填白，笔画以不透明黑色绘制
//!
//! ## 实现思路
//!
//! 1. 解码源文件字节
//! 2. 计算缩放比例 `min(max_width / width, 1)`，按整数截断得到画布尺寸
//! 3. 需要缩小时优先 `fast_image_resize`，失败回退 `image::resize_exact`
//! 4. 遮罩导出为 PNG 字节用于提交

use bytes::Bytes;
use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use super::WorkflowError;

/// 遮罩中“未选中”的颜色。
pub const MASK_BLANK: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// 遮罩中“待修复”的颜色。
pub const MASK_INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// 显示画布上的笔画叠加色 `rgba(94, 23, 235, 0.05)`。
pub const OVERLAY_RGB: [u8; 3] = [94, 23, 235];
pub const OVERLAY_ALPHA: f32 = 0.05;

/// 显示缩放比例：只缩小不放大。
pub fn display_scale(original_width: u32, max_width: u32) -> f64 {
    if original_width == 0 {
        return 1.0;
    }
    (max_width as f64 / original_width as f64).min(1.0)
}

/// 画布尺寸：按缩放比例截断为整数，且每边至少 1 像素。
///
/// 使用整数运算，避免 `2000 * 0.512` 之类的浮点误差导致少一像素。
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width.max(1), height.max(1));
    }
    let scaled_height = (height as u64 * max_width as u64 / width as u64) as u32;
    (max_width.max(1), scaled_height.max(1))
}

/// 解码源文件字节。
pub fn decode_source(bytes: &[u8]) -> Result<DynamicImage, WorkflowError> {
    image::load_from_memory(bytes).map_err(|e| WorkflowError::Decode(e.to_string()))
}

/// 同尺寸的显示画布与遮罩画布。
#[derive(Debug, Clone)]
pub struct CanvasPair {
    display: RgbaImage,
    mask: RgbaImage,
    scale: f64,
    has_ink: bool,
}

impl CanvasPair {
    /// 从源文件字节构建画布对。
    pub fn from_encoded(bytes: &[u8], max_width: u32) -> Result<Self, WorkflowError> {
        let decoded = decode_source(bytes)?;
        Ok(Self::from_image(&decoded, max_width))
    }

    /// 从已解码图片构建画布对。
    pub fn from_image(source: &DynamicImage, max_width: u32) -> Self {
        let (width, height) = source.dimensions();
        let scale = display_scale(width, max_width);
        let (target_width, target_height) = scaled_dimensions(width, height, max_width);

        let display = if (target_width, target_height) == (width, height) {
            source.to_rgba8()
        } else {
            match Self::resize_with_fast_image_resize(source, target_width, target_height) {
                Ok(resized) => resized,
                Err(err) => {
                    log::warn!("⚠️ fast_image_resize 缩放失败，回退 image::resize_exact：{}", err);
                    source
                        .resize_exact(target_width, target_height, FilterType::Triangle)
                        .to_rgba8()
                }
            }
        };

        let mask = RgbaImage::from_pixel(target_width, target_height, MASK_BLANK);

        log::info!(
            "🖼️ 画布已就绪 - 原始尺寸: {}x{} 画布尺寸: {}x{} scale={:.3}",
            width,
            height,
            target_width,
            target_height,
            scale
        );

        Self {
            display,
            mask,
            scale,
            has_ink: false,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.display.dimensions()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn display(&self) -> &RgbaImage {
        &self.display
    }

    pub fn mask(&self) -> &RgbaImage {
        &self.mask
    }

    /// 是否已有笔画落在遮罩上（增量维护，O(1)）。
    pub fn is_mask_drawn(&self) -> bool {
        self.has_ink
    }

    /// 全量扫描遮罩，判断是否存在非白像素。
    pub fn scan_mask_ink(&self) -> bool {
        self.mask.pixels().any(|pixel| *pixel != MASK_BLANK)
    }

    /// 同时借出两块画布，供笔画绘制。
    pub(super) fn surfaces_mut(&mut self) -> (&mut RgbaImage, &mut RgbaImage) {
        (&mut self.display, &mut self.mask)
    }

    pub(super) fn mark_inked(&mut self) {
        self.has_ink = true;
    }

    /// 遮罩快照，编码为 PNG。
    pub fn mask_png(&self) -> Result<Bytes, WorkflowError> {
        let mut cursor = Cursor::new(Vec::new());
        self.mask
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| WorkflowError::Encode(e.to_string()))?;
        Ok(Bytes::from(cursor.into_inner()))
    }

    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
    ) -> Result<RgbaImage, WorkflowError> {
        let src = image.to_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| WorkflowError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new()
            .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| WorkflowError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| WorkflowError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
    }
}
