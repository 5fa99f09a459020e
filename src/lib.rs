//! # 食物识别菜谱工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              显示层（终端 / 任意界面工具包）               │
//! │                                                          │
//! │  UiEvent ──dispatch──▶ WorkflowHandlers                  │
//! │  ViewDescriptor ◀──────── 每次转换后返回                 │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                           │
//! │                                                          │
//! │  ┌─ session ──── SessionController（唯一状态所有者）      │
//! │  │   ├─ capture        相机获取·快照·释放 (RAII)          │
//! │  │   ├─ acquisition    选图校验·帧编码·预览句柄 (RAII)    │
//! │  │   └─ prediction     multipart 上传·响应分类            │
//! │  │                                                       │
//! │  ├─ render ────── 结果 / 错误面板                         │
//! │  ├─ failure ───── FailureOutcome（用户可见失败）          │
//! │  ├─ error ─────── AppError（启动装配错误）                │
//! │  ├─ settings ──── JSON 设置文件                           │
//! │  └─ surface ───── 终端文本渲染                            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`session`] | 模式状态机、互斥表面不变量、处理器注册 |
//! | [`capture`] | 相机后端抽象、幂等获取、快照后立即释放 |
//! | [`acquisition`] | 选图与快照转为 `ImageAsset`，单一存活预览 |
//! | [`prediction`] | 请求生命周期、HTTP 客户端、响应校验 |
//! | [`render`] | 预测结果与失败的结构化展示内容 |
//! | [`failure`] | 失败分类、错误码与阶段 |
//! | [`error`] | 启动阶段的统一错误类型 `AppError` |
//! | [`settings`] | 设置读取、保存与校验 |
//! | [`surface`] | `ViewDescriptor` 的终端渲染 |

pub mod acquisition;
pub mod capture;
pub mod error;
pub mod failure;
pub mod prediction;
pub mod render;
pub mod session;
pub mod settings;
pub mod surface;
