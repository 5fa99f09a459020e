//! 基于 V4L2 设备节点与 `ffmpeg` 的相机实现。
//!
//! 打开设备节点即视为"获得授权"；抓帧时启动一次性 `ffmpeg` 进程，
//! 从 stdout 读取单帧 PNG 并解码。

use std::fs::File;
use std::path::PathBuf;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use super::{CameraBackend, CameraError, LiveFeed};

/// 相机配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// V4L2 设备节点。
    pub device: PathBuf,
    /// `ffmpeg` 可执行文件。
    pub ffmpeg_bin: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/video0"),
            ffmpeg_bin: "ffmpeg".to_string(),
        }
    }
}

/// `ffmpeg` 相机后端。
#[derive(Debug, Clone)]
pub struct FfmpegCamera {
    config: CameraConfig,
}

impl FfmpegCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }
}

impl CameraBackend for FfmpegCamera {
    type Feed = FfmpegFeed;

    async fn open(&self) -> Result<FfmpegFeed, CameraError> {
        let device = self.config.device.clone();

        let handle = tokio::task::spawn_blocking({
            let device = device.clone();
            move || File::open(&device)
        })
        .await
        .map_err(|e| CameraError::Unavailable(format!("open task failed: {e}")))?;

        let handle = match handle {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CameraError::Unavailable(format!(
                    "no device at {}",
                    device.display()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(CameraError::Denied(format!("{}: {e}", device.display())));
            }
            Err(e) => {
                return Err(CameraError::Unavailable(format!("{}: {e}", device.display())));
            }
        };

        log::debug!("📷 已打开设备节点 {}", device.display());

        Ok(FfmpegFeed {
            device,
            ffmpeg_bin: self.config.ffmpeg_bin.clone(),
            handle: Some(handle),
        })
    }
}

/// 已打开的 V4L2 画面。
#[derive(Debug)]
pub struct FfmpegFeed {
    device: PathBuf,
    ffmpeg_bin: String,
    handle: Option<File>,
}

impl FfmpegFeed {
    fn capture_args(&self) -> Vec<String> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "video4linux2".into(),
            "-i".into(),
            self.device.to_string_lossy().into_owned(),
            "-frames:v".into(),
            "1".into(),
            "-f".into(),
            "image2pipe".into(),
            "-vcodec".into(),
            "png".into(),
            "-".into(),
        ]
    }
}

impl LiveFeed for FfmpegFeed {
    async fn capture_frame(&mut self) -> Result<DynamicImage, CameraError> {
        if self.handle.is_none() {
            return Err(CameraError::NotActive);
        }

        let output = Command::new(&self.ffmpeg_bin)
            .args(self.capture_args())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CameraError::Capture(format!("failed to run {}: {e}", self.ffmpeg_bin)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CameraError::Capture(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        image::load_from_memory(&output.stdout)
            .map_err(|e| CameraError::Capture(format!("frame decode failed: {e}")))
    }

    fn stop(&mut self) {
        if self.handle.take().is_some() {
            log::debug!("📷 已关闭设备节点 {}", self.device.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_device_is_unavailable() {
        let camera = FfmpegCamera::new(CameraConfig {
            device: PathBuf::from("/nonexistent/recipe-lens/video9"),
            ..CameraConfig::default()
        });

        assert!(matches!(camera.open().await, Err(CameraError::Unavailable(_))));
    }

    #[test]
    fn capture_args_request_single_png_frame() {
        let feed = FfmpegFeed {
            device: PathBuf::from("/dev/video2"),
            ffmpeg_bin: "ffmpeg".into(),
            handle: None,
        };
        let args = feed.capture_args();

        assert!(args.windows(2).any(|w| w == ["-i", "/dev/video2"]));
        assert!(args.windows(2).any(|w| w == ["-frames:v", "1"]));
        assert_eq!(args.last().map(String::as_str), Some("-"));
    }

    #[tokio::test]
    async fn stopped_feed_refuses_capture() {
        let mut feed = FfmpegFeed {
            device: PathBuf::from("/dev/video2"),
            ffmpeg_bin: "ffmpeg".into(),
            handle: None,
        };
        feed.stop();

        assert!(matches!(feed.capture_frame().await, Err(CameraError::NotActive)));
    }
}
