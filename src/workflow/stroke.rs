//! # 笔画与绘制状态
//!
//! ## 设计思路
//!
//! 一次按下到抬起/离开之间为一条笔画路径。每次移动把“上一点 → 当前点”
//! 这一段同时画到两块画布上：显示画布叠加半透明色，遮罩画布涂黑。
//! 只有加法，没有橡皮擦。
//!
//! ## 实现思路
//!
//! 线段按胶囊体光栅化：像素中心到线段的距离不超过半个笔宽即命中。
//! 只遍历线段包围盒与画布的交集，超出画布的部分直接裁掉。

use image::{Rgba, RgbaImage};

use super::canvas::{CanvasPair, MASK_INK, OVERLAY_ALPHA, OVERLAY_RGB};

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 50;
pub const DEFAULT_STROKE_WIDTH: u32 = 5;

/// 笔刷宽度，构造时即夹到 `[1, 50]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeWidth(u32);

impl StrokeWidth {
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(MIN_STROKE_WIDTH as i64, MAX_STROKE_WIDTH as i64) as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    fn radius(self) -> f32 {
        self.0 as f32 / 2.0
    }
}

impl Default for StrokeWidth {
    fn default() -> Self {
        Self(DEFAULT_STROKE_WIDTH)
    }
}

/// 绘制会话：笔刷宽度 + 当前路径末端点。
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    width: StrokeWidth,
    cursor: Option<(f32, f32)>,
}

impl DrawingSession {
    pub fn new(width: StrokeWidth) -> Self {
        Self {
            width,
            cursor: None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn width(&self) -> StrokeWidth {
        self.width
    }

    pub fn set_width(&mut self, width: StrokeWidth) {
        self.width = width;
    }

    /// 开始新路径。
    pub fn begin(&mut self, x: f32, y: f32) {
        self.cursor = Some((x, y));
    }

    /// 延伸路径，返回需要绘制的线段；未在绘制时返回 `None`。
    pub fn extend(&mut self, x: f32, y: f32) -> Option<((f32, f32), (f32, f32))> {
        let from = self.cursor?;
        self.cursor = Some((x, y));
        Some((from, (x, y)))
    }

    /// 结束路径，已绘制内容保留。
    pub fn end(&mut self) {
        self.cursor = None;
    }
}

/// 把一段笔画画到两块画布上，返回遮罩是否有像素被命中。
///
/// 零长度线段不产生任何像素。
pub fn paint_segment(
    canvases: &mut CanvasPair,
    from: (f32, f32),
    to: (f32, f32),
    width: StrokeWidth,
) -> bool {
    if !from.0.is_finite() || !from.1.is_finite() || !to.0.is_finite() || !to.1.is_finite() {
        return false;
    }
    if from == to {
        return false;
    }

    let (display, mask) = canvases.surfaces_mut();
    let (canvas_width, canvas_height) = mask.dimensions();
    let touched = rasterize_segment(canvas_width, canvas_height, from, to, width.radius(), |x, y| {
        blend_overlay(display, x, y);
        mask.put_pixel(x, y, MASK_INK);
    });

    if touched > 0 {
        canvases.mark_inked();
    }

    log::debug!(
        "✏️ 笔画 ({:.1},{:.1}) -> ({:.1},{:.1}) width={} pixels={}",
        from.0,
        from.1,
        to.0,
        to.1,
        width.get(),
        touched
    );

    touched > 0
}

/// 遍历胶囊体覆盖的像素，返回命中数量。
fn rasterize_segment<F>(
    width: u32,
    height: u32,
    from: (f32, f32),
    to: (f32, f32),
    radius: f32,
    mut plot: F,
) -> usize
where
    F: FnMut(u32, u32),
{
    if width == 0 || height == 0 {
        return 0;
    }

    let min_x = (from.0.min(to.0) - radius).floor().max(0.0);
    let min_y = (from.1.min(to.1) - radius).floor().max(0.0);
    let max_x = (from.0.max(to.0) + radius).ceil().min(width as f32 - 1.0);
    let max_y = (from.1.max(to.1) + radius).ceil().min(height as f32 - 1.0);

    if min_x > max_x || min_y > max_y {
        return 0;
    }

    let radius_sq = radius * radius;
    let mut touched = 0;

    for y in min_y as u32..=max_y as u32 {
        for x in min_x as u32..=max_x as u32 {
            let center = (x as f32 + 0.5, y as f32 + 0.5);
            if distance_sq_to_segment(center, from, to) <= radius_sq {
                plot(x, y);
                touched += 1;
            }
        }
    }

    touched
}

fn distance_sq_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + dx * t, a.1 + dy * t);
    (p.0 - cx) * (p.0 - cx) + (p.1 - cy) * (p.1 - cy)
}

/// source-over 混合叠加色。
fn blend_overlay(display: &mut RgbaImage, x: u32, y: u32) {
    let Rgba([r, g, b, a]) = *display.get_pixel(x, y);
    let dst_alpha = a as f32 / 255.0;
    let out_alpha = OVERLAY_ALPHA + dst_alpha * (1.0 - OVERLAY_ALPHA);

    let mix = |dst: u8, src: u8| -> u8 {
        if out_alpha <= 0.0 {
            return 0;
        }
        let value = (src as f32 * OVERLAY_ALPHA + dst as f32 * dst_alpha * (1.0 - OVERLAY_ALPHA))
            / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };

    display.put_pixel(
        x,
        y,
        Rgba([
            mix(r, OVERLAY_RGB[0]),
            mix(g, OVERLAY_RGB[1]),
            mix(b, OVERLAY_RGB[2]),
            (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
        ]),
    );
}
