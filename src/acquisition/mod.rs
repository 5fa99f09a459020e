//! # 图片获取模块（acquisition）
//!
//! ## 设计思路
//!
//! 把"选图 / 拍照 → 校验或编码 → 签发预览"按职责拆分为多个子模块：
//!
//! - `acquirer`：编排两条获取链路，持有可切换的配置
//! - `loader`：选图的存在性、体积、签名、尺寸校验
//! - `pipeline`：相机帧降采样 + JPEG 编码
//! - `preview`：可撤销预览句柄与单一存活约束
//! - `asset`：会话持有的最终图片资产
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 调用链
//!
//! ```text
//! 会话控制器
//!    ↓
//! acquirer.rs（配置快照 + 阶段耗时日志）
//!    ├─ loader.rs（选图校验）
//!    └─ pipeline.rs（快照编码）
//!    ↓
//! StagedImage → 会话释放旧资产 → ImageAsset::install（preview.rs 签发）
//! ```

mod acquirer;
mod asset;
mod config;
mod error;
mod loader;
mod pipeline;
mod preview;
mod source;

pub use acquirer::ImageAcquirer;
pub use asset::ImageAsset;
pub use config::{AcquisitionConfig, QualityProfile, ResizeFilter};
pub use error::AcquisitionError;
pub use pipeline::SNAPSHOT_MEDIA_TYPE;
pub use preview::{PreviewError, PreviewHandle, PreviewRegistry};
pub use source::{ImageOrigin, PickedFile, StagedImage};
