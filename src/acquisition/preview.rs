//! # 预览句柄管理
//!
//! ## 设计思路
//!
//! 预览句柄是"可撤销"的展示资源（对应浏览器里的 object URL）。
//! 会话同一时刻只允许存在一个存活句柄，因此注册表在签发新句柄前
//! 会检查是否仍有旧句柄未撤销，若有则直接拒绝，而不是悄悄覆盖。
//! 这样"先释放旧预览、再安装新预览"的顺序由类型系统之外的运行时检查兜底。
//!
//! ## 实现思路
//!
//! - `PreviewRegistry` 内部用 `Arc<Mutex<..>>` 记录存活句柄与计数。
//! - `PreviewHandle` 采用 RAII：`Drop` 时自动撤销，即使调用方忘记也不会泄漏。
//! - 预览内容为 base64 `data:` URL，可直接交给显示层。

use std::sync::{Arc, Mutex, MutexGuard};

use base64::{Engine as _, engine::general_purpose};

use super::source::StagedImage;
use crate::failure::FailureOutcome;

/// 预览注册表错误。
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("preview #{0} is still live; release it before publishing a new one")]
    StillLive(u64),
}

impl From<PreviewError> for FailureOutcome {
    fn from(error: PreviewError) -> Self {
        log::error!("❌ 预览签发失败：{}", error);
        FailureOutcome::CaptureFailed("Could not prepare the image preview. Please try again.".to_string())
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    next_id: u64,
    live: Option<u64>,
    issued: u64,
    revoked: u64,
}

/// 预览句柄注册表。
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        lock_state(&self.state)
    }

    /// 为已加载的图片签发预览句柄。
    ///
    /// 若已有存活句柄则返回 `PreviewError::StillLive`。
    pub fn publish(&self, staged: &StagedImage) -> Result<PreviewHandle, PreviewError> {
        let id = {
            let mut state = self.lock();
            if let Some(live) = state.live {
                log::error!("❌ 预览 #{} 尚未释放，拒绝签发新预览", live);
                return Err(PreviewError::StillLive(live));
            }
            state.next_id += 1;
            state.issued += 1;
            state.live = Some(state.next_id);
            state.next_id
        };

        let data_url = format!(
            "data:{};base64,{}",
            staged.media_type,
            general_purpose::STANDARD.encode(&staged.bytes)
        );
        log::debug!("🖼️ 签发预览 #{}（{} bytes）", id, staged.bytes.len());

        Ok(PreviewHandle {
            id,
            data_url,
            state: Arc::clone(&self.state),
        })
    }

    /// 当前存活句柄数量（0 或 1）。
    pub fn live_count(&self) -> usize {
        usize::from(self.lock().live.is_some())
    }

    /// 当前存活句柄 id。
    pub fn live_id(&self) -> Option<u64> {
        self.lock().live
    }

    /// 累计签发数量。
    pub fn issued_total(&self) -> u64 {
        self.lock().issued
    }

    /// 累计撤销数量。
    pub fn revoked_total(&self) -> u64 {
        self.lock().revoked
    }
}

fn lock_state(state: &Mutex<RegistryState>) -> MutexGuard<'_, RegistryState> {
    // 状态只含计数，锁中毒后继续使用内部值是安全的
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 可撤销的预览句柄。
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    data_url: String,
    state: Arc<Mutex<RegistryState>>,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// 显式撤销句柄。
    pub fn revoke(self) {
        drop(self);
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        if state.live == Some(self.id) {
            state.live = None;
            state.revoked += 1;
            log::debug!("🧹 已撤销预览 #{}", self.id);
        }
    }
}
