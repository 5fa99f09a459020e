//! # 配置模块
//!
//! ## 设计思路
//!
//! 将图片获取阶段所有"可调策略"集中到 `AcquisitionConfig`：
//! 选图体积上限、像素上限，以及相机帧的降采样与 JPEG 编码参数。
//! 其中画质档位（quality / balanced / speed）作为高层语义，映射到底层参数组合。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `QualityProfile` 负责档位字符串解析与反向输出。
//! - `apply_profile` 将档位转换为具体阈值，`infer_profile` 从当前配置反推档位。

use fast_image_resize as fr;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::AcquisitionError;

/// 降采样滤镜（可序列化的 `FilterType` 子集）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl ResizeFilter {
    pub(crate) fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }

    pub(crate) fn to_fast_filter(self) -> fr::FilterType {
        match self {
            Self::Nearest => fr::FilterType::Box,
            Self::Triangle => fr::FilterType::Bilinear,
            Self::CatmullRom => fr::FilterType::CatmullRom,
            Self::Lanczos3 => fr::FilterType::Lanczos3,
        }
    }
}

/// 图片获取配置。
///
/// 字段覆盖了选图校验与相机帧编码两个阶段。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// 选图允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 图片头信息中允许的最大像素数（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 相机帧单边最大尺寸，超过则降采样。
    pub max_dimension: u32,
    /// 相机帧 JPEG 编码质量（1~100）。
    pub jpeg_quality: u8,
    /// 降采样滤镜策略。
    pub resize_filter: ResizeFilter,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_dimension: 1920,
            jpeg_quality: 85,
            resize_filter: ResizeFilter::Triangle,
        }
    }
}

/// 画质档位（面向用户语义）。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与上传体积平衡
/// - `Speed`：优先上传速度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityProfile {
    Quality,
    Balanced,
    Speed,
}

impl QualityProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use recipe_lens::acquisition::QualityProfile;
    ///
    /// let p = QualityProfile::parse("balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), recipe_lens::acquisition::AcquisitionError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, AcquisitionError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(AcquisitionError::InvalidFormat(format!(
                "unknown quality profile: {other} (expected quality / balanced / speed)"
            ))),
        }
    }

    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl AcquisitionConfig {
    /// 基于当前参数反推画质档位。
    pub fn infer_profile(&self) -> QualityProfile {
        if self.jpeg_quality >= 95 && self.max_dimension >= 4096 {
            return QualityProfile::Quality;
        }

        if self.jpeg_quality <= 70 || self.max_dimension <= 1280 {
            return QualityProfile::Speed;
        }

        QualityProfile::Balanced
    }

    /// 应用指定档位到实际参数。
    pub fn apply_profile(&mut self, profile: QualityProfile) {
        match profile {
            QualityProfile::Quality => {
                self.jpeg_quality = 95;
                self.max_dimension = 4096;
                self.resize_filter = ResizeFilter::CatmullRom;
            }
            QualityProfile::Balanced => {
                self.jpeg_quality = 85;
                self.max_dimension = 1920;
                self.resize_filter = ResizeFilter::Triangle;
            }
            QualityProfile::Speed => {
                self.jpeg_quality = 70;
                self.max_dimension = 1280;
                self.resize_filter = ResizeFilter::Nearest;
            }
        }
    }

    /// 校验配置取值范围。
    pub fn validate(&self) -> Result<(), AcquisitionError> {
        if self.max_file_size < 1024 {
            return Err(AcquisitionError::InvalidFormat(
                "max_file_size must be at least 1 KiB".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(AcquisitionError::InvalidFormat(
                "jpeg_quality must be between 1 and 100".to_string(),
            ));
        }
        if !(64..=16_384).contains(&self.max_dimension) {
            return Err(AcquisitionError::InvalidFormat(
                "max_dimension must be between 64 and 16384".to_string(),
            ));
        }
        if self.max_decoded_pixels == 0 {
            return Err(AcquisitionError::InvalidFormat(
                "max_decoded_pixels must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
