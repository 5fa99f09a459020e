//! # 预测请求模块（prediction）
//!
//! ## 设计思路
//!
//! - `config`：服务地址、字段名、超时
//! - `wire`：请求负载、原始响应与响应分类
//! - `model`：结构化预测结果
//! - `client`：`PredictionService` 抽象与 `reqwest` 实现
//! - `lifecycle`：单次提交的往返编排与耗时日志
//!
//! ## 调用链
//!
//! ```text
//! 会话 begin_submit → PendingSubmission
//!    ↓
//! lifecycle.rs run()
//!    ├─ client.rs send()（multipart 上传）
//!    └─ wire.rs classify_reply()（状态码 + 结构校验）
//!    ↓
//! SubmissionOutcome → 会话 finish_submit
//! ```

mod client;
mod config;
mod lifecycle;
mod model;
mod wire;

pub use client::{HttpPredictionService, PredictionService, TransportError};
pub use config::PredictionConfig;
pub use lifecycle::{PendingSubmission, PredictionLifecycle, SubmissionOutcome};
pub use model::{Ingredient, PredictionResult, RecipeStructure};
pub use wire::{ServiceReply, SubmissionPayload, classify_reply};
