//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 工作流内部的失败已经由 [`crate::failure::FailureOutcome`] 在边界处消化，
//! 这里的 `AppError` 只覆盖"启动与装配"阶段：读取设置、构建 HTTP 客户端、
//! 终端输入输出等。这些错误会直接终止启动流程，而不是进入会话状态机。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error`、`serde_json::Error` 提供 `From` 转换，无需手动 map。

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 设置文件读写或校验失败
    #[error("设置错误: {0}")]
    Settings(String),

    /// 设置文件 JSON 解析失败
    #[error("设置文件解析失败: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    /// 预测服务客户端构建失败
    #[error("预测服务客户端错误: {0}")]
    Client(String),

    /// 文件系统 / 终端 I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
}
