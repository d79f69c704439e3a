//! 通知模块
//!
//! # 设计思路
//!
//! 工作流不直接操作任何 UI 控件，只把短消息压入队列；
//! 调用方（界面层或 CLI）在每次交互后 `drain` 并自行展示。
//! 消息是瞬时的：取出即移除，不做持久化。

use chrono::{DateTime, Local};
use serde::Serialize;

/// 通知类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// 一条瞬时通知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Local>,
}

/// 待展示通知队列（先进先出）。
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        match kind {
            NotificationKind::Error => log::warn!("🔔 [error] {}", message),
            _ => log::debug!("🔔 [{:?}] {}", kind, message),
        }
        self.pending.push(Notification {
            kind,
            message,
            created_at: Local::now(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message);
    }

    /// 取出全部待展示通知。
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_in_order_and_clears() {
        let mut queue = NotificationQueue::new();
        queue.success("uploaded");
        queue.error("boom");
        queue.info("eta 00:30");

        let drained = queue.drain();

        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].kind, NotificationKind::Success);
        assert_eq!(drained[1].message, "boom");
        assert_eq!(drained[2].kind, NotificationKind::Info);
        assert!(queue.is_empty());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationKind::Error).expect("serialize failed");

        assert_eq!(json, "\"error\"");
    }
}
