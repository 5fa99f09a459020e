//! 设置文件读写与校验。
//!
//! 设置以 JSON 保存在 `<config_dir>/recipe-lens/settings.json`，
//! 缺失的字段使用默认值，文件不存在时整体使用默认值。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::acquisition::{AcquisitionConfig, QualityProfile};
use crate::capture::CameraConfig;
use crate::error::AppError;
use crate::prediction::PredictionConfig;

/// 图片获取设置：基础参数 + 可选画质档位。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionSettings {
    #[serde(flatten)]
    pub config: AcquisitionConfig,
    /// 档位会覆盖对应的画质参数。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl AcquisitionSettings {
    /// 应用档位后的最终配置。
    pub fn effective(&self) -> Result<AcquisitionConfig, AppError> {
        let mut config = self.config.clone();
        if let Some(profile) = &self.profile {
            let profile = QualityProfile::parse(profile)
                .map_err(|e| AppError::Settings(format!("acquisition.profile 无效: {}", e)))?;
            config.apply_profile(profile);
        }
        Ok(config)
    }
}

/// 应用设置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub prediction: PredictionConfig,
    pub acquisition: AcquisitionSettings,
    pub camera: CameraConfig,
    /// 拍照后自动提交。
    pub auto_submit_snapshot: bool,
}

impl AppSettings {
    /// 默认设置文件路径。
    pub fn default_path() -> Result<PathBuf, AppError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::Settings("无法定位用户配置目录".to_string()))?;
        Ok(config_dir.join("recipe-lens").join("settings.json"))
    }

    /// 读取设置；文件不存在时返回默认值。
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::info!("⚙️ 未找到设置文件 {}，使用默认设置", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;

        log::info!("⚙️ 已加载设置文件 {}", path.display());
        Ok(settings)
    }

    /// 保存设置（自动创建目录）。
    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Settings(format!("创建设置目录失败: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::debug!("💾 设置已写入 {}", path.display());
        Ok(())
    }

    /// 校验全部设置。
    pub fn validate(&self) -> Result<(), AppError> {
        self.prediction.validate()?;
        self.acquisition
            .effective()?
            .validate()
            .map_err(|e| AppError::Settings(format!("acquisition 设置无效: {}", e)))?;

        if self.camera.ffmpeg_bin.trim().is_empty() {
            return Err(AppError::Settings("camera.ffmpeg_bin 不能为空".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        std::env::temp_dir()
            .join(format!("recipe-lens-settings-{}-{}", std::process::id(), nanos))
            .join(name)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = AppSettings::load(&temp_path("absent.json")).expect("load");

        assert_eq!(settings.prediction.endpoint, "http://127.0.0.1:5000/predict");
        assert!(!settings.auto_submit_snapshot);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = temp_path("settings.json");
        let mut settings = AppSettings::default();
        settings.prediction.endpoint = "http://10.0.0.2:8080/predict".to_string();
        settings.acquisition.profile = Some("speed".to_string());
        settings.auto_submit_snapshot = true;

        settings.save(&path).expect("save");
        let loaded = AppSettings::load(&path).expect("load");

        assert_eq!(loaded.prediction.endpoint, "http://10.0.0.2:8080/predict");
        assert_eq!(loaded.acquisition.profile.as_deref(), Some("speed"));
        assert_eq!(loaded.acquisition.effective().expect("effective").max_dimension, 1280);
        assert!(loaded.auto_submit_snapshot);

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn partial_document_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"camera":{"device":"/dev/video3"},"acquisition":{"jpeg_quality":60}}"#)
                .expect("parse");

        assert_eq!(settings.camera.device, PathBuf::from("/dev/video3"));
        assert_eq!(settings.camera.ffmpeg_bin, "ffmpeg");
        assert_eq!(settings.acquisition.config.jpeg_quality, 60);
        assert_eq!(settings.prediction.field_name, "file");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let mut settings = AppSettings::default();
        settings.acquisition.profile = Some("ultra".to_string());

        assert!(matches!(settings.validate(), Err(AppError::Settings(_))));
    }
}
