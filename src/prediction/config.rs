//! 预测服务连接配置。

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 预测服务配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// 预测接口地址。
    pub endpoint: String,
    /// multipart 文件字段名。
    pub field_name: String,
    /// 上传时声明的文件名。
    pub upload_file_name: String,
    /// 建连超时（秒）。
    pub connect_timeout_secs: u64,
    /// 整体请求超时（秒）；`None` 表示不限制。
    pub request_timeout_secs: Option<u64>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/predict".to_string(),
            field_name: "file".to_string(),
            upload_file_name: "image.jpg".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: None,
        }
    }
}

impl PredictionConfig {
    /// 校验配置合法性
    pub fn validate(&self) -> Result<(), AppError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| AppError::Settings(format!("endpoint 无效 ({}): {}", self.endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Settings(format!(
                "endpoint 仅支持 http/https，当前为 {}",
                url.scheme()
            )));
        }

        if self.field_name.trim().is_empty() {
            return Err(AppError::Settings("field_name 不能为空".to_string()));
        }
        if self.upload_file_name.trim().is_empty() {
            return Err(AppError::Settings("upload_file_name 不能为空".to_string()));
        }

        if !(1..=120).contains(&self.connect_timeout_secs) {
            return Err(AppError::Settings(format!(
                "connect_timeout_secs 超出范围 [1, 120]: {}",
                self.connect_timeout_secs
            )));
        }

        if let Some(secs) = self.request_timeout_secs
            && !(1..=600).contains(&secs)
        {
            return Err(AppError::Settings(format!(
                "request_timeout_secs 超出范围 [1, 600]: {}",
                secs
            )));
        }

        Ok(())
    }
}
