//! # 相机资源模块（capture）
//!
//! ## 设计思路
//!
//! 相机是"显式获取、必定释放"的作用域资源：
//! - `CameraBackend` / `LiveFeed` 把硬件与驱动抽象成最小原语（打开、抓帧、停止）
//! - `CameraManager` 在原语之上实现幂等获取、安全释放、单次快照
//! - `FfmpegCamera` 是基于 V4L2 设备节点 + `ffmpeg` 抓帧的默认实现
//!
//! ## 实现思路
//!
//! - 获取失败统一映射为 `CameraError`，在会话边界转换成 `CameraAccessDenied`。
//! - 快照无论成功与否都会立即释放设备（一次拍照消耗一次实时画面）。
//! - `CameraManager` 的 `Drop` 会释放仍持有的设备，保证任何退出路径都不泄漏。

mod ffmpeg;
mod manager;

pub use ffmpeg::{CameraConfig, FfmpegCamera, FfmpegFeed};
pub use manager::CameraManager;

use image::DynamicImage;

use crate::failure::{CAMERA_DENIED_MESSAGE, FailureOutcome};

/// 相机链路错误。
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    /// 平台拒绝访问（权限）。
    #[error("camera access denied: {0}")]
    Denied(String),

    /// 没有可用设备。
    #[error("no camera available: {0}")]
    Unavailable(String),

    /// 未获取设备就请求拍照。
    #[error("camera is not active")]
    NotActive,

    /// 抓帧失败。
    #[error("frame capture failed: {0}")]
    Capture(String),
}

impl From<CameraError> for FailureOutcome {
    fn from(error: CameraError) -> Self {
        match error {
            CameraError::NotActive => FailureOutcome::camera_inactive(),
            CameraError::Denied(detail) | CameraError::Unavailable(detail) => {
                log::warn!("⚠️ 相机不可用：{}", detail);
                FailureOutcome::CameraAccessDenied(CAMERA_DENIED_MESSAGE.to_string())
            }
            CameraError::Capture(detail) => {
                log::warn!("⚠️ 相机抓帧失败：{}", detail);
                FailureOutcome::camera_denied()
            }
        }
    }
}

/// 相机后端：负责打开实时画面。
///
/// 实现方只需关注硬件原语，幂等与释放时机由 [`CameraManager`] 负责。
#[allow(async_fn_in_trait)]
pub trait CameraBackend {
    type Feed: LiveFeed;

    /// 请求设备，挂起直到平台授权或拒绝。
    async fn open(&self) -> Result<Self::Feed, CameraError>;
}

/// 已打开的实时画面。
#[allow(async_fn_in_trait)]
pub trait LiveFeed {
    /// 抓取当前画面为静态帧。
    async fn capture_frame(&mut self) -> Result<DynamicImage, CameraError>;

    /// 停止画面并释放底层设备。
    fn stop(&mut self);
}
