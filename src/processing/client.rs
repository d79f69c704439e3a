//! # HTTP 客户端
//!
//! ## 设计思路
//!
//! `ProcessingClient` 只负责“载荷 → multipart 请求 → 产物/错误”的转换，
//! 不持有任何工作流状态。单飞控制、通知与状态迁移都在工作流一侧完成。
//!
//! ## 实现思路
//!
//! - 复用同一个 `reqwest::Client`，所有接口共享一个可配置的 `base_url`。
//! - 不设置整体请求超时：失败完全由 HTTP 响应或网络错误驱动。
//! - 非 2xx 响应体按纯文本读取，原样作为错误详情。

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use std::time::{Duration, Instant};

use super::payload::{FilePart, SubmissionPayload};
use super::{ProcessingError, ResultArtifact};
use crate::config::AppConfig;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// 外部处理服务客户端。
#[derive(Debug, Clone)]
pub struct ProcessingClient {
    pub(super) http: reqwest::Client,
    base_url: String,
}

impl ProcessingClient {
    /// 根据配置创建客户端。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use pixel_perfect::config::AppConfig;
    /// use pixel_perfect::processing::ProcessingClient;
    ///
    /// let client = ProcessingClient::new(&AppConfig::default())?;
    /// assert_eq!(client.endpoint("inpaint"), "http://localhost:80/inpaint");
    /// # Ok::<(), pixel_perfect::processing::ProcessingError>(())
    /// ```
    pub fn new(config: &AppConfig) -> Result<Self, ProcessingError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        let http = builder
            .build()
            .map_err(|e| ProcessingError::Request(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 拼接接口地址。
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// 发送一次提交并读取结果产物。
    ///
    /// 该调用不会重试；一旦发出就运行到成功或失败为止。
    pub async fn submit(&self, payload: SubmissionPayload) -> Result<ResultArtifact, ProcessingError> {
        let url = self.endpoint(payload.flow.endpoint_path());
        let total_bytes = payload.total_bytes();
        let form = Self::build_form(&payload)?;

        log::info!(
            "📤 提交处理请求 #{} - flow={:?} url={} payload={} bytes",
            payload.request_id,
            payload.flow,
            url,
            total_bytes
        );

        let start = Instant::now();
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let result = Self::read_artifact(response).await;
        match &result {
            Ok(artifact) => log::info!(
                "✅ 请求 #{} 完成 - {} bytes ({}) elapsed={}ms",
                payload.request_id,
                artifact.len(),
                artifact.mime_type(),
                start.elapsed().as_millis()
            ),
            Err(err) => log::warn!(
                "❌ 请求 #{} 失败 - {} elapsed={}ms",
                payload.request_id,
                err,
                start.elapsed().as_millis()
            ),
        }
        result
    }

    fn build_form(payload: &SubmissionPayload) -> Result<Form, ProcessingError> {
        let mut form = Form::new().part(payload.file.field, Self::file_part(&payload.file)?);

        if let Some(mask) = &payload.mask {
            form = form.part(mask.field, Self::file_part(mask)?);
        }

        if let Some(job_id) = &payload.job_id {
            form = form.text("id", job_id.clone());
        }

        Ok(form)
    }

    /// 构建文件字段。
    ///
    /// 上传时声明的 MIME 不做校验；无法解析时按内容嗅探，嗅探失败记为
    /// `application/octet-stream`，请求照常发出。
    fn file_part(part: &FilePart) -> Result<Part, ProcessingError> {
        let build = || Part::bytes(part.bytes.to_vec()).file_name(part.file_name.clone());

        match build().mime_str(&part.mime_type) {
            Ok(file_part) => Ok(file_part),
            Err(err) => {
                let fallback = infer::get(&part.bytes)
                    .map(|kind| kind.mime_type())
                    .unwrap_or(FALLBACK_MIME_TYPE);
                log::warn!(
                    "⚠️ 字段 {} 的 MIME 类型 {:?} 无效（{}），改用 {}",
                    part.field,
                    part.mime_type,
                    err,
                    fallback
                );
                build().mime_str(fallback).map_err(|e| {
                    ProcessingError::Request(format!("字段 {} 的 MIME 类型无效：{}", part.field, e))
                })
            }
        }
    }

    /// 将响应转换为产物；非 2xx 时读取文本响应体作为错误详情。
    pub(super) async fn read_artifact(
        response: reqwest::Response,
    ) -> Result<ResultArtifact, ProcessingError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProcessingError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProcessingError::Transport(format!("读取响应失败：{}", e)))?;

        if bytes.is_empty() {
            return Err(ProcessingError::InvalidResponse("服务返回了空结果".to_string()));
        }

        Ok(ResultArtifact::new(bytes, content_type.as_deref()))
    }

    pub(super) fn map_transport_error(e: reqwest::Error) -> ProcessingError {
        if e.is_connect() {
            ProcessingError::Transport(format!("无法连接处理服务：{}", e))
        } else {
            ProcessingError::Transport(format!("请求失败：{}", e))
        }
    }
}
