//! # 数据源与中间模型
//!
//! 将"外部输入"和"流水线中间结果"解耦：
//! - `PickedFile` 表示文件选择器交出的引用
//! - `StagedImage` 表示已加载、已校验但尚未安装到会话的图片

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Local};

/// 文件选择器交出的文件引用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// 本地路径。
    pub path: PathBuf,
    /// 选择器声明的媒体类型（可能缺失或不准确）。
    pub declared_media_type: Option<String>,
}

impl PickedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declared_media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.declared_media_type = Some(media_type.into());
        self
    }
}

/// 图片来源。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    PickedFile,
    Camera,
}

impl fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PickedFile => f.write_str("file"),
            Self::Camera => f.write_str("camera"),
        }
    }
}

/// 加载阶段输出：已校验的图片字节与元信息。
#[derive(Debug, Clone)]
pub struct StagedImage {
    /// 原样上传的图片字节。
    pub bytes: Bytes,
    /// 嗅探得到的媒体类型。
    pub media_type: String,
    /// 展示用文件名。
    pub file_name: String,
    pub origin: ImageOrigin,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
}
