//! # 工作流模块（workflow）
//!
//! ## 设计思路
//!
//! 每个工作流实例对应一次编辑会话，状态全部由实例独占：
//!
//! - `MaskEditWorkflow`：上传 → 涂抹遮罩 → 提交修复
//! - `SingleFileWorkflow`：降噪 / 超分 / MRI 重建，上传单个文件直接提交
//!
//! 两者共享同一套请求生命周期（`lifecycle`）：同一时刻最多一个在途请求，
//! 失败后回到可编辑状态，由用户决定是否重试。
//!
//! ## 子模块
//!
//! | 模块 | 职责 |
//! |------|------|
//! | `source` | 源文件（字节 + 名称 + MIME） |
//! | `canvas` | 显示画布与遮罩画布，缩放与 PNG 导出 |
//! | `stroke` | 笔刷宽度、绘制路径、线段光栅化 |
//! | `lifecycle` | 请求状态机与阶段 |
//! | `error` | 用户输入类错误 |

mod canvas;
mod error;
mod lifecycle;
mod mask_editor;
mod single_file;
mod source;
mod stroke;

pub use canvas::{
    CanvasPair, MASK_BLANK, MASK_INK, OVERLAY_ALPHA, OVERLAY_RGB, display_scale, scaled_dimensions,
};
pub use error::WorkflowError;
pub use lifecycle::{RequestLifecycle, RequestState, WorkflowPhase};
pub use mask_editor::MaskEditWorkflow;
pub use single_file::SingleFileWorkflow;
pub use source::SourceImage;
pub use stroke::{
    DEFAULT_STROKE_WIDTH, DrawingSession, MAX_STROKE_WIDTH, MIN_STROKE_WIDTH, StrokeWidth,
    paint_segment,
};
