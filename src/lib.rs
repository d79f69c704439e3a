//! # Pixel Perfect — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              调用方（界面层 / 命令行 cli）                  │
//! │   upload · pointer_* · set_stroke_width · submit          │
//! │   take_notifications · download_artifact · hand_off       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ &mut self（单一所有者，无锁）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  ┌─ workflow ─── MaskEditWorkflow / SingleFileWorkflow     │
//! │  │   ├─ canvas     显示画布 + 遮罩画布（缩放·PNG 导出）      │
//! │  │   ├─ stroke     笔刷宽度 · 线段光栅化                    │
//! │  │   └─ lifecycle  Idle → Submitting → Succeeded|Failed    │
//! │  │                                                       │
//! │  ├─ processing ── ProcessingClient (reqwest multipart)    │
//! │  │   └─ polling    有上限的任务状态轮询                     │
//! │  │                                                       │
//! │  ├─ notification  瞬时通知队列                             │
//! │  ├─ config ────── AppConfig (JSON + 环境变量)              │
//! │  └─ error ─────── AppError (统一错误类型)                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`config`] | 服务地址、画布宽度上限、笔刷与轮询参数 |
//! | [`notification`] | 成功 / 错误 / 提示消息队列 |
//! | [`workflow`] | 上传、遮罩绘制、提交的状态机 |
//! | [`processing`] | 外部处理服务的请求、响应、轮询与结果产物 |
//! | [`cli`] | 无界面命令行入口 |

pub mod error;
pub mod cli;
pub mod config;
pub mod notification;
pub mod processing;
pub mod workflow;
