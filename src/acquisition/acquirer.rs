//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageAcquirer` 只负责流程编排与配置管理，不直接接触会话状态。
//! 两条链路：
//! 1. 选图：读取配置快照 → 加载字节 → 校验
//! 2. 快照：读取配置快照 → 降采样 → 编码 JPEG
//!
//! 产出的 `StagedImage` 交给会话，由会话负责"先释放旧预览、再安装新资产"。
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<AcquisitionConfig>>` 支持运行时切换画质档位。
//! - 单次获取使用同一配置快照，避免处理中途配置漂移。
//! - 记录各阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use image::DynamicImage;

use super::source::{PickedFile, StagedImage};
use super::{AcquisitionConfig, AcquisitionError, QualityProfile, loader, pipeline};

/// 图片获取器。
#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    config: Arc<RwLock<AcquisitionConfig>>,
}

impl ImageAcquirer {
    /// # 示例
    /// ```rust
    /// use recipe_lens::acquisition::{AcquisitionConfig, ImageAcquirer};
    ///
    /// let acquirer = ImageAcquirer::new(AcquisitionConfig::default());
    /// assert_eq!(acquirer.profile()?.as_str(), "balanced");
    /// # Ok::<(), recipe_lens::acquisition::AcquisitionError>(())
    /// ```
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<AcquisitionConfig, AcquisitionError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| AcquisitionError::ResourceLimit("config lock poisoned".to_string()))
    }

    /// 切换画质档位。
    pub fn set_profile(&self, profile: &str) -> Result<(), AcquisitionError> {
        let profile = QualityProfile::parse(profile)?;
        let mut config = self
            .config
            .write()
            .map_err(|_| AcquisitionError::ResourceLimit("config lock poisoned".to_string()))?;
        config.apply_profile(profile);

        log::info!(
            "⚙️ 已切换画质档位：{:?}（jpeg_quality={}, max_dim={}, filter={:?}）",
            profile,
            config.jpeg_quality,
            config.max_dimension,
            config.resize_filter
        );

        Ok(())
    }

    /// 当前生效档位。
    pub fn profile(&self) -> Result<QualityProfile, AcquisitionError> {
        Ok(self.config_snapshot()?.infer_profile())
    }

    /// 从选图结果生成待安装图片。
    ///
    /// 没有文件引用时返回 `AcquisitionError::NoFile`。
    pub async fn from_picked_file(
        &self,
        file: Option<&PickedFile>,
    ) -> Result<StagedImage, AcquisitionError> {
        let file = file.ok_or(AcquisitionError::NoFile)?;
        let config = self.config_snapshot()?;

        let start = Instant::now();
        let staged = loader::load_picked_file(file, &config).await?;
        log::info!(
            "✅ 选图加载完成 - {}x{} {} load={}ms",
            staged.width,
            staged.height,
            staged.media_type,
            start.elapsed().as_millis()
        );

        Ok(staged)
    }

    /// 将相机快照帧编码为待安装图片。
    pub async fn from_camera_snapshot(
        &self,
        frame: DynamicImage,
    ) -> Result<StagedImage, AcquisitionError> {
        let config = self.config_snapshot()?;

        let start = Instant::now();
        let staged = pipeline::encode_camera_frame(frame, &config).await?;
        log::info!("✅ 快照编码完成 - encode={}ms", start.elapsed().as_millis());

        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reference_is_no_file() {
        let acquirer = ImageAcquirer::new(AcquisitionConfig::default());

        let result = acquirer.from_picked_file(None).await;

        assert!(matches!(result, Err(AcquisitionError::NoFile)));
    }

    #[test]
    fn set_and_get_profile_roundtrip() {
        let acquirer = ImageAcquirer::new(AcquisitionConfig::default());

        for name in ["quality", "speed", "balanced"] {
            acquirer.set_profile(name).expect("set profile should succeed");
            assert_eq!(acquirer.profile().expect("get profile").as_str(), name);
        }
    }

    #[test]
    fn rejects_invalid_profile() {
        let acquirer = ImageAcquirer::new(AcquisitionConfig::default());

        assert!(matches!(
            acquirer.set_profile("unknown-profile"),
            Err(AcquisitionError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_uses_current_profile() {
        let acquirer = ImageAcquirer::new(AcquisitionConfig::default());
        acquirer.set_profile("speed").expect("set profile");

        let frame = DynamicImage::new_rgb8(2000, 1000);
        let staged = acquirer.from_camera_snapshot(frame).await.expect("encode");

        assert_eq!((staged.width, staged.height), (1280, 640));
    }
}
