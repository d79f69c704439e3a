//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子模块保留自己的错误枚举（`WorkflowError` / `ProcessingError`），
//! 在库边界统一汇总为 `AppError`，命令行入口与配置加载只面对这一种类型。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 子模块错误通过 `#[from]` 自动转换，调用侧直接 `?`。
//! - 实现 `Serialize` 将错误序列化为字符串，便于跨 JSON 边界返回。

use serde::Serialize;

use crate::processing::ProcessingError;
use crate::workflow::WorkflowError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 工作流拒绝了本次操作
    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    /// 调用处理服务失败
    #[error("{0}")]
    Processing(#[from] ProcessingError),

    /// 请求已发出但处理失败，携带展示给用户的原因
    #[error("处理失败: {0}")]
    Failed(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置文件或命令行参数不合法
    #[error("配置错误: {0}")]
    Config(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
