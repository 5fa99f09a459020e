//! # 预测服务客户端
//!
//! ## 设计思路
//!
//! `PredictionService` 只描述"一次请求 → 一次原始响应"，不做任何语义判断：
//! 状态码与响应体的分类统一交给 [`super::wire::classify_reply`]。
//! 这样测试可以用内存实现替换网络，而分类规则只有一份。
//!
//! ## 实现思路
//!
//! - `HttpPredictionService` 基于 `reqwest`，以 multipart 单文件字段上传。
//! - 只设置建连超时；整体超时可选，默认不限制。
//! - 不重试：一次提交只发一次请求。

use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::config::PredictionConfig;
use super::wire::{ServiceReply, SubmissionPayload};
use crate::error::AppError;

/// 传输层失败（未拿到任何响应）。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// 远程预测服务。
#[allow(async_fn_in_trait)]
pub trait PredictionService {
    /// 发送一次预测请求，返回原始响应。
    async fn send(&self, payload: &SubmissionPayload) -> Result<ServiceReply, TransportError>;
}

/// 基于 HTTP multipart 的预测服务实现。
#[derive(Debug, Clone)]
pub struct HttpPredictionService {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    field_name: String,
    upload_file_name: String,
}

impl HttpPredictionService {
    pub fn new(config: &PredictionConfig) -> Result<Self, AppError> {
        config.validate()?;

        let endpoint = reqwest::Url::parse(&config.endpoint)
            .map_err(|e| AppError::Client(format!("endpoint 无效：{}", e)))?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Client(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            client,
            endpoint,
            field_name: config.field_name.clone(),
            upload_file_name: config.upload_file_name.clone(),
        })
    }

    fn map_reqwest_error(e: reqwest::Error) -> TransportError {
        let detail = if e.is_timeout() {
            "request timed out".to_string()
        } else if e.is_connect() {
            format!("connection failed: {}", e)
        } else {
            format!("request failed: {}", e)
        };
        TransportError(format!("Could not reach the prediction service ({detail})."))
    }
}

impl PredictionService for HttpPredictionService {
    async fn send(&self, payload: &SubmissionPayload) -> Result<ServiceReply, TransportError> {
        let part = Part::bytes(payload.bytes.to_vec())
            .file_name(self.upload_file_name.clone())
            .mime_str(&payload.media_type)
            .map_err(|e| TransportError(format!("Invalid media type {}: {}", payload.media_type, e)))?;
        let form = Form::new().part(self.field_name.clone(), part);

        log::debug!(
            "🌐 POST {}（{} bytes, {}）",
            self.endpoint,
            payload.bytes.len(),
            payload.media_type
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(Self::map_reqwest_error)?;

        Ok(ServiceReply {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}
