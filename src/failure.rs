//! # 失败结果模型
//!
//! ## 设计思路
//!
//! 工作流里所有"用户可见"的失败都收敛到 `FailureOutcome` 一个枚举：
//! 相机、选图、请求、响应四个边界各自把内部错误转换成它，之后不再向外传播。
//! 会话控制器只需要根据 `kind()` 决定是弹出提示（模式不变）还是进入 ErrorReady。
//!
//! ## 实现思路
//!
//! - `thiserror` 负责人类可读消息，`Display` 即错误面板要显示的文本。
//! - `ServerRejected` 的消息原样来自服务端，不加任何前缀。
//! - `code()` / `stage()` 沿用图片模块的稳定错误码约定，便于前端和日志区分。

use std::fmt;

/// 相机不可用时给用户的统一提示。
pub const CAMERA_DENIED_MESSAGE: &str =
    "Could not access camera. Please check permissions and try again.";
/// 相机未启动却请求拍照。
pub const CAMERA_INACTIVE_MESSAGE: &str = "Camera is not active.";
/// 尚未准备图片就提交。
pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";
/// 拍照编码失败。
pub const CAPTURE_FAILED_MESSAGE: &str = "Error capturing image. Please try again.";
/// 请求进行中时的任何操作。
pub const BUSY_MESSAGE: &str = "A prediction is already in progress. Please wait.";

/// 失败类别（不携带消息，便于匹配与统计）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    CameraAccessDenied,
    NoImageSelected,
    CaptureFailed,
    Busy,
    NetworkFailure,
    ServerRejected,
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CameraAccessDenied => "CameraAccessDenied",
            Self::NoImageSelected => "NoImageSelected",
            Self::CaptureFailed => "CaptureFailed",
            Self::Busy => "Busy",
            Self::NetworkFailure => "NetworkFailure",
            Self::ServerRejected => "ServerRejected",
            Self::MalformedResponse => "MalformedResponse",
        };
        f.write_str(name)
    }
}

/// 工作流失败结果。
///
/// 每个变体携带最终展示给用户的消息。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureOutcome {
    #[error("{0}")]
    CameraAccessDenied(String),

    #[error("{0}")]
    NoImageSelected(String),

    #[error("{0}")]
    CaptureFailed(String),

    #[error("{0}")]
    Busy(String),

    #[error("{0}")]
    NetworkFailure(String),

    #[error("{0}")]
    ServerRejected(String),

    #[error("{0}")]
    MalformedResponse(String),
}

impl FailureOutcome {
    pub fn camera_denied() -> Self {
        Self::CameraAccessDenied(CAMERA_DENIED_MESSAGE.to_string())
    }

    pub fn camera_inactive() -> Self {
        Self::CameraAccessDenied(CAMERA_INACTIVE_MESSAGE.to_string())
    }

    pub fn no_image() -> Self {
        Self::NoImageSelected(NO_IMAGE_MESSAGE.to_string())
    }

    pub fn busy() -> Self {
        Self::Busy(BUSY_MESSAGE.to_string())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::CameraAccessDenied(_) => FailureKind::CameraAccessDenied,
            Self::NoImageSelected(_) => FailureKind::NoImageSelected,
            Self::CaptureFailed(_) => FailureKind::CaptureFailed,
            Self::Busy(_) => FailureKind::Busy,
            Self::NetworkFailure(_) => FailureKind::NetworkFailure,
            Self::ServerRejected(_) => FailureKind::ServerRejected,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
        }
    }

    /// 展示给用户的消息。
    pub fn message(&self) -> &str {
        match self {
            Self::CameraAccessDenied(m)
            | Self::NoImageSelected(m)
            | Self::CaptureFailed(m)
            | Self::Busy(m)
            | Self::NetworkFailure(m)
            | Self::ServerRejected(m)
            | Self::MalformedResponse(m) => m,
        }
    }

    /// 稳定错误码，供前端与日志使用。
    pub fn code(&self) -> &'static str {
        match self {
            Self::CameraAccessDenied(_) => "E_CAMERA_DENIED",
            Self::NoImageSelected(_) => "E_NO_IMAGE",
            Self::CaptureFailed(_) => "E_CAPTURE",
            Self::Busy(_) => "E_BUSY",
            Self::NetworkFailure(_) => "E_NETWORK",
            Self::ServerRejected(_) => "E_SERVER_REJECTED",
            Self::MalformedResponse(_) => "E_MALFORMED_RESPONSE",
        }
    }

    /// 失败发生的阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::CameraAccessDenied(_) | Self::CaptureFailed(_) => "camera",
            Self::NoImageSelected(_) | Self::Busy(_) => "acquisition",
            Self::NetworkFailure(_) => "request",
            Self::ServerRejected(_) | Self::MalformedResponse(_) => "response",
        }
    }

    /// 是否属于"阻塞提示"类失败：只提示用户，不改变会话模式。
    pub fn is_prompt(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::CameraAccessDenied | FailureKind::NoImageSelected | FailureKind::Busy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_rejected_displays_message_verbatim() {
        let failure = FailureOutcome::ServerRejected("model unavailable".to_string());

        assert_eq!(failure.to_string(), "model unavailable");
        assert_eq!(failure.kind(), FailureKind::ServerRejected);
        assert_eq!(failure.stage(), "response");
    }

    #[test]
    fn prompts_are_camera_and_selection_failures_only() {
        assert!(FailureOutcome::camera_denied().is_prompt());
        assert!(FailureOutcome::no_image().is_prompt());
        assert!(FailureOutcome::busy().is_prompt());
        assert!(!FailureOutcome::NetworkFailure("down".into()).is_prompt());
        assert!(!FailureOutcome::MalformedResponse("bad".into()).is_prompt());
    }

    #[test]
    fn camera_inactive_is_camera_access_class() {
        let failure = FailureOutcome::camera_inactive();

        assert_eq!(failure.kind(), FailureKind::CameraAccessDenied);
        assert_eq!(failure.code(), "E_CAMERA_DENIED");
        assert_eq!(failure.message(), CAMERA_INACTIVE_MESSAGE);
    }
}
