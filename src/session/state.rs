//! 单一工作流状态：模式、当前图片、相机句柄与最近一次结果。

use super::view::{Controls, Mode, Notice, PreviewPane, Tab, ViewDescriptor};
use crate::acquisition::{ImageAsset, PreviewRegistry};
use crate::capture::{CameraBackend, CameraManager};
use crate::render::RenderedOutcome;

/// 工作流状态。
///
/// 会话独占至多一个 `ImageAsset` 与至多一个相机句柄。
pub struct CaptureSession<B: CameraBackend> {
    pub(crate) mode: Mode,
    pub(crate) tab: Tab,
    pub(crate) active_image: Option<ImageAsset>,
    pub(crate) camera: CameraManager<B>,
    pub(crate) outcome: Option<RenderedOutcome>,
    pub(crate) notice: Option<Notice>,
    pub(crate) in_flight: Option<u64>,
    pub(crate) next_submission: u64,
}

impl<B: CameraBackend> CaptureSession<B> {
    pub fn new(camera: CameraManager<B>) -> Self {
        Self {
            mode: Mode::UploadIdle,
            tab: Tab::Upload,
            active_image: None,
            camera,
            outcome: None,
            notice: None,
            in_flight: None,
            next_submission: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn active_image(&self) -> Option<&ImageAsset> {
        self.active_image.as_ref()
    }

    pub fn camera(&self) -> &CameraManager<B> {
        &self.camera
    }

    pub fn outcome(&self) -> Option<&RenderedOutcome> {
        self.outcome.as_ref()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// 释放当前图片（撤销预览）。
    pub(crate) fn release_image(&mut self) {
        if let Some(asset) = self.active_image.take() {
            asset.release();
        }
    }

    /// 投影为声明式视图。
    pub fn view(&self) -> ViewDescriptor {
        let submitting = self.mode == Mode::Submitting;
        let companion_preview = self.mode.is_outcome() && self.active_image.is_some();
        let preview_visible = self.mode == Mode::Previewing || companion_preview;

        let preview = self
            .active_image
            .as_ref()
            .filter(|_| preview_visible)
            .map(|asset| {
                let (width, height) = asset.dimensions();
                PreviewPane {
                    id: asset.preview().id(),
                    data_url: asset.preview().data_url().to_string(),
                    origin: asset.origin(),
                    file_name: asset.file_name().to_string(),
                    width,
                    height,
                }
            });

        let controls = Controls {
            switch_enabled: !submitting,
            pick_enabled: !submitting && self.tab == Tab::Upload,
            snapshot_enabled: self.mode == Mode::CameraIdle && self.camera.is_acquired(),
            submit_enabled: !submitting
                && self.active_image.is_some()
                && matches!(self.mode, Mode::Previewing | Mode::ResultReady | Mode::ErrorReady),
        };

        ViewDescriptor {
            mode: self.mode,
            tab: self.tab,
            primary: self.mode.primary_surface(),
            companion_preview,
            preview,
            outcome: self.outcome.clone(),
            notice: self.notice.clone(),
            controls,
            camera_live: self.camera.is_acquired(),
        }
    }

    /// 检查会话级不变量。
    pub(crate) fn check_invariants(&self, previews: &PreviewRegistry) -> Result<(), String> {
        self.view().validate()?;

        let live = previews.live_count();
        let held = usize::from(self.active_image.is_some());
        if live != held {
            return Err(format!("{live} live preview(s) but session holds {held} image(s)"));
        }

        if (self.mode == Mode::Submitting) != self.in_flight.is_some() {
            return Err(format!(
                "mode {} with in-flight submission {:?}",
                self.mode, self.in_flight
            ));
        }

        if self.mode == Mode::Previewing && self.active_image.is_none() {
            return Err("previewing without an active image".to_string());
        }

        Ok(())
    }
}
