//! # 错误模型模块
//!
//! 使用单一错误枚举承载图片获取链路中的所有错误来源，
//! 在会话边界统一转换为 [`FailureOutcome`]。

use crate::failure::{CAPTURE_FAILED_MESSAGE, FailureOutcome};

/// 图片获取统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("no file selected")]
    NoFile,

    #[error("{0}")]
    FileSystem(String),

    #[error("{0}")]
    InvalidFormat(String),

    #[error("{0}")]
    ResourceLimit(String),

    #[error("frame encoding failed: {0}")]
    Encode(String),
}

impl From<AcquisitionError> for FailureOutcome {
    fn from(error: AcquisitionError) -> Self {
        match error {
            AcquisitionError::NoFile => FailureOutcome::no_image(),
            AcquisitionError::FileSystem(msg)
            | AcquisitionError::InvalidFormat(msg)
            | AcquisitionError::ResourceLimit(msg) => FailureOutcome::NoImageSelected(msg),
            AcquisitionError::Encode(detail) => {
                log::warn!("⚠️ 相机帧编码失败：{}", detail);
                FailureOutcome::CaptureFailed(CAPTURE_FAILED_MESSAGE.to_string())
            }
        }
    }
}
