//! # 会话控制器
//!
//! ## 设计思路
//!
//! `SessionController` 是工作流状态的唯一所有者，所有变更都经过具名转换：
//!
//! | 转换 | 前置条件 | 结果模式 |
//! |------|----------|----------|
//! | `switch_to_upload` | 非提交中 | UploadIdle（释放相机、图片、结果） |
//! | `switch_to_camera` | 非提交中 | CameraIdle（释放图片、结果，获取相机） |
//! | `load_file` | 非提交中 | Previewing（先释放旧图片再安装新图片） |
//! | `snapshot` | CameraIdle 且持有相机 | Previewing（抓帧后立即释放相机） |
//! | `begin_submit` | 持有图片、非提交中 | Submitting |
//! | `finish_submit` | 提交编号匹配 | ResultReady / ErrorReady |
//!
//! ## 实现思路
//!
//! - 提示类失败（相机不可用、未选图、忙碌）只挂通知，不改模式。
//! - 其余失败进入 ErrorReady，错误面板只显示消息。
//! - 每次转换结束调用 `checkpoint`，校验视图一致性、相机与预览资源不变量。
//! - 提交拆成 begin / run / finish 三段，请求期间不借用会话。

use std::sync::Arc;

use super::state::CaptureSession;
use super::view::{Mode, Notice, Tab, ViewDescriptor};
use crate::acquisition::{ImageAcquirer, ImageAsset, PickedFile, PreviewRegistry, StagedImage};
use crate::capture::{CameraBackend, CameraManager};
use crate::failure::FailureOutcome;
use crate::prediction::{
    PendingSubmission, PredictionLifecycle, PredictionService, SubmissionOutcome, SubmissionPayload,
};
use crate::render::RenderedOutcome;

/// 会话控制器。
pub struct SessionController<C: CameraBackend, S> {
    session: CaptureSession<C>,
    lifecycle: Arc<PredictionLifecycle<S>>,
    acquirer: ImageAcquirer,
    previews: PreviewRegistry,
}

impl<C: CameraBackend, S: PredictionService> SessionController<C, S> {
    pub fn new(camera: C, service: S, acquirer: ImageAcquirer) -> Self {
        Self {
            session: CaptureSession::new(CameraManager::new(camera)),
            lifecycle: Arc::new(PredictionLifecycle::new(service)),
            acquirer,
            previews: PreviewRegistry::new(),
        }
    }

    /// 请求生命周期的共享句柄，供调用方在不借用会话的情况下执行往返。
    pub fn lifecycle(&self) -> Arc<PredictionLifecycle<S>> {
        Arc::clone(&self.lifecycle)
    }

    pub fn acquirer(&self) -> &ImageAcquirer {
        &self.acquirer
    }

    /// 切换到上传模式：释放相机与图片，清空结果。
    pub fn switch_to_upload(&mut self) -> ViewDescriptor {
        if let Some(view) = self.refuse_if_busy("switch_to_upload") {
            return view;
        }

        self.session.camera.release();
        self.reset_display();
        self.session.mode = Mode::UploadIdle;
        self.session.tab = Tab::Upload;
        log::info!("📁 切换到上传模式");

        self.checkpoint("switch_to_upload")
    }

    /// 切换到相机模式并获取设备。
    ///
    /// 获取失败时保持 CameraIdle 并挂出 `CameraAccessDenied` 提示。
    pub async fn switch_to_camera(&mut self) -> ViewDescriptor {
        if let Some(view) = self.refuse_if_busy("switch_to_camera") {
            return view;
        }

        self.reset_display();
        self.session.mode = Mode::CameraIdle;
        self.session.tab = Tab::Camera;
        log::info!("📷 切换到相机模式");

        if let Err(e) = self.session.camera.acquire().await {
            return self.fail(FailureOutcome::from(e), "switch_to_camera");
        }

        self.checkpoint("switch_to_camera")
    }

    /// 处理文件选择结果。
    pub async fn load_file(&mut self, file: Option<PickedFile>) -> ViewDescriptor {
        if let Some(view) = self.refuse_if_busy("load_file") {
            return view;
        }

        let staged = match self.acquirer.from_picked_file(file.as_ref()).await {
            Ok(staged) => staged,
            Err(e) => return self.fail(FailureOutcome::from(e), "load_file"),
        };

        self.session.camera.release();
        self.session.tab = Tab::Upload;
        self.install_and_preview(staged, "load_file")
    }

    /// 抓取相机画面作为待提交图片。
    pub async fn snapshot(&mut self) -> ViewDescriptor {
        if let Some(view) = self.refuse_if_busy("snapshot") {
            return view;
        }

        if self.session.mode != Mode::CameraIdle || !self.session.camera.is_acquired() {
            return self.fail(FailureOutcome::camera_inactive(), "snapshot");
        }

        let frame = match self.session.camera.snapshot().await {
            Ok(frame) => frame,
            Err(e) => return self.fail(FailureOutcome::from(e), "snapshot"),
        };

        let staged = match self.acquirer.from_camera_snapshot(frame).await {
            Ok(staged) => staged,
            Err(e) => return self.fail(FailureOutcome::from(e), "snapshot"),
        };

        self.session.tab = Tab::Camera;
        self.install_and_preview(staged, "snapshot")
    }

    /// 校验并进入 Submitting，返回待执行的提交。
    ///
    /// 失败时挂出提示（`NoImageSelected` 或 `Busy`），模式不变，不发任何请求。
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, FailureOutcome> {
        self.session.notice = None;

        if self.session.mode == Mode::Submitting {
            let failure = FailureOutcome::busy();
            self.post_notice(&failure, "begin_submit");
            return Err(failure);
        }

        let Some(asset) = self.session.active_image.as_ref() else {
            let failure = FailureOutcome::no_image();
            self.post_notice(&failure, "begin_submit");
            return Err(failure);
        };

        let payload = SubmissionPayload {
            bytes: asset.bytes().clone(),
            media_type: asset.media_type().to_string(),
        };

        self.session.next_submission += 1;
        let id = self.session.next_submission;
        self.session.in_flight = Some(id);
        self.session.outcome = None;
        self.session.mode = Mode::Submitting;
        log::info!("⏳ 进入提交中（#{}）", id);

        self.checkpoint("begin_submit");
        Ok(PendingSubmission::new(id, payload))
    }

    /// 应用提交结果。编号不匹配的结果直接丢弃。
    pub fn finish_submit(&mut self, outcome: SubmissionOutcome) -> ViewDescriptor {
        if self.session.mode != Mode::Submitting || self.session.in_flight != Some(outcome.id) {
            log::warn!(
                "⚠️ 丢弃过期提交结果 #{}（当前 {:?}，模式 {}）",
                outcome.id,
                self.session.in_flight,
                self.session.mode
            );
            return self.view();
        }

        self.session.in_flight = None;
        self.session.notice = None;
        match &outcome.result {
            Ok(result) => {
                self.session.outcome = Some(RenderedOutcome::from_result(result));
                self.session.mode = Mode::ResultReady;
            }
            Err(failure) => {
                self.session.outcome = Some(RenderedOutcome::from_failure(failure));
                self.session.mode = Mode::ErrorReady;
            }
        }

        self.checkpoint("finish_submit")
    }

    /// 完整提交：校验、往返、应用结果。
    pub async fn submit(&mut self) -> ViewDescriptor {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(_) => return self.view(),
        };

        let lifecycle = self.lifecycle();
        let outcome = lifecycle.run(pending).await;
        self.finish_submit(outcome)
    }

    fn install_and_preview(&mut self, staged: StagedImage, transition: &str) -> ViewDescriptor {
        self.session.outcome = None;
        self.session.release_image();

        let asset = match ImageAsset::install(staged, &self.previews) {
            Ok(asset) => asset,
            Err(e) => return self.fail(FailureOutcome::from(e), transition),
        };
        log::info!(
            "🖼️ 已安装图片（{}，{}x{}）",
            asset.origin(),
            asset.dimensions().0,
            asset.dimensions().1
        );
        self.session.active_image = Some(asset);
        self.session.mode = Mode::Previewing;

        self.checkpoint(transition)
    }

    fn refuse_if_busy(&mut self, transition: &str) -> Option<ViewDescriptor> {
        self.session.notice = None;
        if self.session.mode != Mode::Submitting {
            return None;
        }

        log::debug!("⏳ 提交进行中，拒绝 {}", transition);
        self.post_notice(&FailureOutcome::busy(), transition);
        Some(self.view())
    }

    /// 提示类失败挂通知；其余进入 ErrorReady。
    fn fail(&mut self, failure: FailureOutcome, transition: &str) -> ViewDescriptor {
        if failure.is_prompt() {
            self.post_notice(&failure, transition);
        } else {
            log::warn!("⚠️ {} 失败：{}（{}）", transition, failure, failure.code());
            if self.session.camera.is_acquired() {
                self.session.camera.release();
            }
            self.session.outcome = Some(RenderedOutcome::from_failure(&failure));
            self.session.mode = Mode::ErrorReady;
        }

        self.checkpoint(transition)
    }

    fn post_notice(&mut self, failure: &FailureOutcome, transition: &str) {
        log::info!("🔔 {} 提示：{}", transition, failure);
        self.session.notice = Some(Notice::from(failure));
    }
}

impl<C: CameraBackend, S> SessionController<C, S> {
    pub fn session(&self) -> &CaptureSession<C> {
        &self.session
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// 当前视图。
    pub fn view(&self) -> ViewDescriptor {
        self.session.view()
    }

    /// 检查全部会话不变量。
    pub fn check_invariants(&self) -> Result<(), String> {
        self.session.check_invariants(&self.previews)
    }

    /// 释放全部作用域资源并回到初始模式。
    pub fn shutdown(&mut self) {
        self.session.camera.release();
        self.session.release_image();
        self.session.outcome = None;
        self.session.notice = None;
        self.session.in_flight = None;
        self.session.mode = Mode::UploadIdle;
        self.session.tab = Tab::Upload;
        log::debug!("🧹 会话资源已释放");
    }

    fn reset_display(&mut self) {
        self.session.release_image();
        self.session.outcome = None;
    }

    fn checkpoint(&self, transition: &str) -> ViewDescriptor {
        if let Err(violation) = self.check_invariants() {
            log::error!("❌ {} 之后不变量被破坏：{}", transition, violation);
        }
        self.view()
    }
}

impl<C: CameraBackend, S> Drop for SessionController<C, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
