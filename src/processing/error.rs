//! # 处理服务错误模型
//!
//! ## 设计思路
//!
//! 请求链路上的失败只分两类：
//! - 传输失败（连接不上、读取响应中断）
//! - 服务端失败（非 2xx，响应体按纯文本透传给用户）
//!
//! 在状态机层两者等价，都会进入 `Failed`；区分它们只为日志与诊断。

/// 处理服务调用错误。
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// 网络层失败（连接、DNS、读取中断等）。
    #[error("网络错误：{0}")]
    Transport(String),

    /// 服务端返回非 2xx 状态。
    #[error("服务端错误（HTTP {status}）：{message}")]
    Server { status: u16, message: String },

    /// 响应可达但内容不可用（空响应、JSON 结构不符等）。
    #[error("响应无效：{0}")]
    InvalidResponse(String),

    /// 请求构建失败（URL 非法、multipart 元数据非法）。
    #[error("请求构建失败：{0}")]
    Request(String),

    /// 异步任务在服务端失败，携带服务端给出的原因。
    #[error("任务失败：{0}")]
    JobFailed(String),

    /// 轮询达到最大次数仍未得到终态。
    #[error("轮询超时：已尝试 {attempts} 次")]
    TimedOut { attempts: u32 },
}

/// 未提供服务端细节时对用户展示的兜底文案。
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process image. Please try again.";
/// 轮询超时时对用户展示的文案。
pub const TIMED_OUT_MESSAGE: &str = "Processing timed out. Please try again.";

impl ProcessingError {
    /// 面向通知栏的用户文案。
    ///
    /// 服务端错误与任务失败原样透传服务端给出的文本；
    /// 其余情况只在日志中保留细节，通知栏统一展示通用文案。
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { status, message } => {
                if message.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    message.clone()
                }
            }
            Self::JobFailed(message) if !message.trim().is_empty() => message.clone(),
            Self::TimedOut { .. } => TIMED_OUT_MESSAGE.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// 稳定错误码，供日志与前端分支使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Server { .. } => "server",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Request(_) => "request",
            Self::JobFailed(_) => "job_failed",
            Self::TimedOut { .. } => "timed_out",
        }
    }
}

impl From<ProcessingError> for String {
    fn from(error: ProcessingError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_surfaces_body_verbatim() {
        let error = ProcessingError::Server {
            status: 500,
            message: "mask too small".to_string(),
        };

        assert_eq!(error.user_message(), "mask too small");
        assert_eq!(error.code(), "server");
    }

    #[test]
    fn server_error_without_body_falls_back_to_status() {
        let error = ProcessingError::Server {
            status: 502,
            message: "  ".to_string(),
        };

        assert_eq!(error.user_message(), "HTTP 502");
    }

    #[test]
    fn empty_transport_message_uses_generic_fallback() {
        let error = ProcessingError::Transport(String::new());

        assert_eq!(error.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn transport_detail_stays_out_of_notifications() {
        let cases = [
            ProcessingError::Transport("无法连接处理服务：connection refused".to_string()),
            ProcessingError::InvalidResponse("服务返回了空结果".to_string()),
            ProcessingError::Request("字段 image 的 MIME 类型无效".to_string()),
        ];

        for error in cases {
            assert_eq!(error.user_message(), GENERIC_FAILURE_MESSAGE, "{:?}", error);
        }
    }

    #[test]
    fn job_failure_keeps_server_reason() {
        assert_eq!(
            ProcessingError::JobFailed("model crashed".to_string()).user_message(),
            "model crashed"
        );
        assert_eq!(
            ProcessingError::JobFailed(String::new()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            ProcessingError::TimedOut { attempts: 3 }.user_message(),
            TIMED_OUT_MESSAGE
        );
    }
}
