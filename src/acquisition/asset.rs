//! 会话持有的图片资产：不可变字节 + 可撤销预览句柄。

use bytes::Bytes;

use super::preview::{PreviewError, PreviewHandle, PreviewRegistry};
use super::source::{ImageOrigin, StagedImage};

/// 已安装到会话的图片。
///
/// 字节在生命周期内不可变；预览句柄随资产一起释放。
#[derive(Debug)]
pub struct ImageAsset {
    staged: StagedImage,
    preview: PreviewHandle,
}

impl ImageAsset {
    /// 为已加载图片签发预览并组装资产。
    ///
    /// 调用方必须先释放旧资产，否则注册表会拒绝签发。
    pub fn install(staged: StagedImage, previews: &PreviewRegistry) -> Result<Self, PreviewError> {
        let preview = previews.publish(&staged)?;
        Ok(Self { staged, preview })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.staged.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.staged.media_type
    }

    pub fn file_name(&self) -> &str {
        &self.staged.file_name
    }

    pub fn origin(&self) -> ImageOrigin {
        self.staged.origin
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.staged.width, self.staged.height)
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// 释放资产并撤销预览。
    pub fn release(self) {
        let id = self.preview.id();
        drop(self);
        log::debug!("🗑️ 已释放图片资产（预览 #{}）", id);
    }
}
