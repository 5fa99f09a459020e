//! # 声明式视图描述
//!
//! ## 设计思路
//!
//! 显示层不读取会话内部状态，只消费 `ViewDescriptor`：
//! - `primary`：唯一的主表面（上传 / 相机 / 预览 / 加载 / 结果 / 错误）
//! - `companion_preview`：结果或错误面板旁边附带的预览
//! - `notice`：阻塞提示（相机不可用、未选图、忙碌）
//! - `controls`：各按钮是否可用
//!
//! 主表面是单值字段，"同时只有一个主表面"由类型保证；
//! `validate()` 负责检查其余一致性约束。

use std::fmt;

use serde::Serialize;

use crate::acquisition::ImageOrigin;
use crate::failure::{FailureKind, FailureOutcome};
use crate::render::RenderedOutcome;

/// 会话模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mode {
    UploadIdle,
    CameraIdle,
    Previewing,
    Submitting,
    ResultReady,
    ErrorReady,
}

impl Mode {
    /// 模式对应的主表面。
    pub fn primary_surface(self) -> Surface {
        match self {
            Self::UploadIdle => Surface::Upload,
            Self::CameraIdle => Surface::Camera,
            Self::Previewing => Surface::Preview,
            Self::Submitting => Surface::Loading,
            Self::ResultReady => Surface::Result,
            Self::ErrorReady => Surface::Error,
        }
    }

    /// 是否为结果/错误终态。
    pub fn is_outcome(self) -> bool {
        matches!(self, Self::ResultReady | Self::ErrorReady)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 模式切换按钮（高亮哪个标签页）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Tab {
    Upload,
    Camera,
}

/// 可见表面。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Surface {
    Upload,
    Camera,
    Preview,
    Loading,
    Result,
    Error,
}

/// 预览区域内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewPane {
    pub id: u64,
    pub data_url: String,
    #[serde(serialize_with = "serialize_display")]
    pub origin: ImageOrigin,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// 阻塞提示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    #[serde(serialize_with = "serialize_display")]
    pub kind: FailureKind,
    pub code: &'static str,
    pub message: String,
}

impl From<&FailureOutcome> for Notice {
    fn from(failure: &FailureOutcome) -> Self {
        Self {
            kind: failure.kind(),
            code: failure.code(),
            message: failure.message().to_string(),
        }
    }
}

fn serialize_display<T: fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// 控件可用性。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Controls {
    pub switch_enabled: bool,
    pub pick_enabled: bool,
    pub snapshot_enabled: bool,
    pub submit_enabled: bool,
}

/// 声明式视图描述。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewDescriptor {
    pub mode: Mode,
    pub tab: Tab,
    pub primary: Surface,
    pub companion_preview: bool,
    pub preview: Option<PreviewPane>,
    pub outcome: Option<RenderedOutcome>,
    pub notice: Option<Notice>,
    pub controls: Controls,
    pub camera_live: bool,
}

impl ViewDescriptor {
    /// 某个表面当前是否可见。
    pub fn is_visible(&self, surface: Surface) -> bool {
        self.primary == surface || (surface == Surface::Preview && self.companion_preview)
    }

    /// 当前可见的全部表面（主表面在前）。
    pub fn visible_surfaces(&self) -> Vec<Surface> {
        let mut surfaces = vec![self.primary];
        if self.companion_preview {
            surfaces.push(Surface::Preview);
        }
        surfaces
    }

    /// 校验视图一致性。
    pub fn validate(&self) -> Result<(), String> {
        if self.primary != self.mode.primary_surface() {
            return Err(format!(
                "mode {} expects primary {:?}, found {:?}",
                self.mode,
                self.mode.primary_surface(),
                self.primary
            ));
        }

        if self.companion_preview && !self.mode.is_outcome() {
            return Err(format!("companion preview shown outside an outcome panel ({})", self.mode));
        }

        let preview_visible = self.primary == Surface::Preview || self.companion_preview;
        if preview_visible != self.preview.is_some() {
            return Err(format!(
                "preview content present={} but preview visible={}",
                self.preview.is_some(),
                preview_visible
            ));
        }

        match (&self.outcome, self.mode) {
            (Some(RenderedOutcome::Result(_)), Mode::ResultReady)
            | (Some(RenderedOutcome::Error(_)), Mode::ErrorReady)
            | (None, Mode::UploadIdle | Mode::CameraIdle | Mode::Previewing | Mode::Submitting) => {}
            (outcome, mode) => {
                return Err(format!(
                    "outcome {:?} inconsistent with mode {}",
                    outcome.as_ref().map(|o| if o.is_result() { "result" } else { "error" }),
                    mode
                ));
            }
        }

        if self.camera_live && self.mode != Mode::CameraIdle {
            return Err(format!("camera is live while mode is {}", self.mode));
        }

        if self.mode == Mode::Submitting
            && (self.controls.submit_enabled
                || self.controls.switch_enabled
                || self.controls.pick_enabled
                || self.controls.snapshot_enabled)
        {
            return Err("controls enabled while submitting".to_string());
        }

        Ok(())
    }
}
