//! # 会话模块（session）
//!
//! ## 设计思路
//!
//! - `state`：`CaptureSession`，单一工作流状态
//! - `controller`：`SessionController`，具名转换与不变量检查
//! - `view`：显示层消费的声明式视图
//! - `handlers`：`WorkflowHandlers` 处理器与事件分发
//!
//! ## 模式流转
//!
//! ```text
//! UploadIdle ──选图──▶ Previewing ──提交──▶ Submitting ──▶ ResultReady / ErrorReady
//!     ▲                    ▲                                      │
//!     │ 切换               │ 快照                                 │ 切换 / 选图
//!     ▼                    │                                      ▼
//! CameraIdle ──────────────┘                           UploadIdle / CameraIdle / Previewing
//! ```

mod controller;
mod handlers;
mod state;
mod view;

pub use controller::SessionController;
pub use handlers::{UiEvent, WorkflowHandlers, dispatch};
pub use state::CaptureSession;
pub use view::{Controls, Mode, Notice, PreviewPane, Surface, Tab, ViewDescriptor};
