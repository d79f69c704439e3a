//! # 应用配置模块
//!
//! ## 设计思路
//!
//! 所有可调参数集中在 `AppConfig`，来源按优先级叠加：
//! 1. 内置默认值
//! 2. JSON 配置文件（可选，缺失字段使用默认值）
//! 3. 环境变量 `PIXEL_PERFECT_BASE_URL`（仅覆盖服务地址）
//!
//! 提交、状态查询、结果拉取统一使用同一个 `base_url`。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AppError;

/// 覆盖服务地址的环境变量名。
pub const BASE_URL_ENV: &str = "PIXEL_PERFECT_BASE_URL";

/// 画布宽度上限的默认值（像素）。
pub const DEFAULT_MAX_DISPLAY_WIDTH: u32 = 1024;

/// 应用配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 外部处理服务根地址。
    pub base_url: String,
    /// 显示画布与遮罩画布的最大宽度（像素）。只影响画布，不影响上传字节。
    pub max_display_width: u32,
    /// 初始笔刷宽度，加载时会被夹到 1~50。
    pub default_stroke_width: i64,
    /// 建立连接超时（秒）。`None` 表示不限制，失败完全由网络层决定。
    pub connect_timeout_secs: Option<u64>,
    /// 状态轮询间隔（毫秒）。
    pub poll_interval_ms: u64,
    /// 状态轮询最大次数。
    pub poll_max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:80".to_string(),
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            default_stroke_width: 5,
            connect_timeout_secs: None,
            poll_interval_ms: 1_000,
            poll_max_attempts: 30,
        }
    }
}

impl AppConfig {
    /// 读取配置：文件（可选）→ 环境变量覆盖 → 校验。
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                log::info!("⚙️ 使用环境变量 {} 覆盖服务地址", BASE_URL_ENV);
                config.base_url = base_url.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取配置，不做环境变量覆盖。
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, AppError> {
        serde_json::from_str::<Self>(content)
            .map_err(|e| AppError::Config(format!("解析配置文件失败: {}", e)))
    }

    /// 校验配置取值范围。
    pub fn validate(&self) -> Result<(), AppError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::Config("base_url 不能为空".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "base_url 仅支持 HTTP/HTTPS：{}",
                base_url
            )));
        }
        if self.max_display_width == 0 {
            return Err(AppError::Config("max_display_width 必须大于 0".to_string()));
        }
        if self.poll_max_attempts == 0 {
            return Err(AppError::Config("poll_max_attempts 必须大于 0".to_string()));
        }
        if let Some(0) = self.connect_timeout_secs {
            return Err(AppError::Config("connect_timeout_secs 必须大于 0".to_string()));
        }
        Ok(())
    }
}
