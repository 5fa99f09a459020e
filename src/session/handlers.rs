//! 界面事件与处理器注册。
//!
//! 显示层只通过 `WorkflowHandlers` 与会话交互；
//! 工具包事件先映射为 `UiEvent`，再由 `dispatch` 路由到对应处理器。

use super::controller::SessionController;
use super::view::{Tab, ViewDescriptor};
use crate::acquisition::PickedFile;
use crate::capture::CameraBackend;
use crate::prediction::PredictionService;

/// 工作流处理器。
#[allow(async_fn_in_trait)]
pub trait WorkflowHandlers {
    async fn view_switch(&mut self, target: Tab) -> ViewDescriptor;

    async fn file_acquired(&mut self, file: Option<PickedFile>) -> ViewDescriptor;

    async fn snapshot_requested(&mut self) -> ViewDescriptor;

    async fn submit_requested(&mut self) -> ViewDescriptor;
}

/// 界面事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SwitchView(Tab),
    FileAcquired(Option<PickedFile>),
    SnapshotRequested,
    SubmitRequested,
}

/// 将事件路由到处理器。
pub async fn dispatch<H: WorkflowHandlers>(handlers: &mut H, event: UiEvent) -> ViewDescriptor {
    log::debug!("🎛️ 分发事件：{:?}", event);
    match event {
        UiEvent::SwitchView(target) => handlers.view_switch(target).await,
        UiEvent::FileAcquired(file) => handlers.file_acquired(file).await,
        UiEvent::SnapshotRequested => handlers.snapshot_requested().await,
        UiEvent::SubmitRequested => handlers.submit_requested().await,
    }
}

impl<C: CameraBackend, S: PredictionService> WorkflowHandlers for SessionController<C, S> {
    async fn view_switch(&mut self, target: Tab) -> ViewDescriptor {
        match target {
            Tab::Upload => self.switch_to_upload(),
            Tab::Camera => self.switch_to_camera().await,
        }
    }

    async fn file_acquired(&mut self, file: Option<PickedFile>) -> ViewDescriptor {
        self.load_file(file).await
    }

    async fn snapshot_requested(&mut self) -> ViewDescriptor {
        self.snapshot().await
    }

    async fn submit_requested(&mut self) -> ViewDescriptor {
        self.submit().await
    }
}
