//! # 选图加载与校验模块
//!
//! ## 设计思路
//!
//! 在"尽可能早"的阶段执行输入校验，把不可用的文件拦在网络请求之前。
//! 通过校验的文件字节原样上传，不做重编码。
//!
//! ## 实现思路
//!
//! - 存在性 + metadata 体积限制，再读取全部字节。
//! - 使用 `infer` 按文件签名嗅探媒体类型，拒绝非图片内容。
//! - 仅读取图片头获取尺寸，按像素上限快速拒绝。

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use chrono::Local;

use super::source::{ImageOrigin, PickedFile, StagedImage};
use super::{AcquisitionConfig, AcquisitionError};

/// 读取并校验选中的文件。
pub(crate) async fn load_picked_file(
    file: &PickedFile,
    config: &AcquisitionConfig,
) -> Result<StagedImage, AcquisitionError> {
    log::info!("📁 开始读取选中图片 - 路径: {}", file.path.display());

    let metadata = match tokio::fs::metadata(&file.path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AcquisitionError::FileSystem(format!(
                "File not found: {}",
                file.path.display()
            )));
        }
        Err(e) => {
            return Err(AcquisitionError::FileSystem(format!(
                "Could not read file information: {e}"
            )));
        }
    };

    if !metadata.is_file() {
        return Err(AcquisitionError::FileSystem(format!(
            "Not a regular file: {}",
            file.path.display()
        )));
    }

    if metadata.len() == 0 {
        return Err(AcquisitionError::InvalidFormat("The selected file is empty.".to_string()));
    }

    if metadata.len() > config.max_file_size {
        return Err(AcquisitionError::ResourceLimit(format!(
            "File too large: {:.2} MB (limit: {:.2} MB)",
            metadata.len() as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| AcquisitionError::FileSystem(format!("Could not read the image file: {e}")))?;

    let media_type = sniff_media_type(&bytes, file.declared_media_type.as_deref())?;
    let (width, height) = inspect_dimensions(&bytes)?;
    validate_pixel_limits(config, width, height)?;

    log::debug!(
        "🔍 选图校验通过 - 类型: {} 尺寸: {}x{} 体积: {} bytes",
        media_type,
        width,
        height,
        bytes.len()
    );

    Ok(StagedImage {
        bytes: Bytes::from(bytes),
        media_type,
        file_name: display_file_name(&file.path),
        origin: ImageOrigin::PickedFile,
        width,
        height,
        captured_at: Local::now(),
    })
}

/// 按文件签名嗅探媒体类型。
///
/// 签名优先于选择器声明的类型；签名无法识别时退回声明的 `image/*` 类型，
/// 两者都不可用时拒绝。
pub(crate) fn sniff_media_type(
    bytes: &[u8],
    declared: Option<&str>,
) -> Result<String, AcquisitionError> {
    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => {
            if let Some(declared) = declared
                && !declared.eq_ignore_ascii_case(kind.mime_type())
            {
                log::debug!(
                    "声明类型 {} 与签名类型 {} 不一致，以签名为准",
                    declared,
                    kind.mime_type()
                );
            }
            Ok(kind.mime_type().to_string())
        }
        Some(kind) => Err(AcquisitionError::InvalidFormat(format!(
            "The selected file is not an image ({}).",
            kind.mime_type()
        ))),
        // 尺寸检查仍会拦截非图片内容
        None => match declared.map(str::to_ascii_lowercase) {
            Some(declared) if declared.starts_with("image/") => Ok(declared),
            _ => Err(AcquisitionError::InvalidFormat(
                "The selected file is not a recognized image.".to_string(),
            )),
        },
    }
}

/// 仅通过内存中的图片头信息读取宽高。
pub(crate) fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), AcquisitionError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AcquisitionError::InvalidFormat(format!("Unrecognized image format: {e}")))?
        .into_dimensions()
        .map_err(|e| AcquisitionError::InvalidFormat(format!("Unsupported image: {e}")))
}

/// 校验像素数量是否超过配置上限。
pub(crate) fn validate_pixel_limits(
    config: &AcquisitionConfig,
    width: u32,
    height: u32,
) -> Result<(), AcquisitionError> {
    let pixels = (width as u64) * (height as u64);

    if pixels == 0 {
        return Err(AcquisitionError::InvalidFormat("The image has no pixels.".to_string()));
    }

    if pixels > config.max_decoded_pixels {
        return Err(AcquisitionError::ResourceLimit(format!(
            "Image too large: {} pixels (limit: {} pixels)",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::path::PathBuf;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        cursor.into_inner()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("recipe-lens-loader-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn loads_png_and_sniffs_media_type() {
        let path = temp_path("ok.png");
        std::fs::write(&path, create_png_bytes(32, 16)).expect("write test file failed");

        let staged = load_picked_file(
            &PickedFile::new(&path).with_media_type("image/jpeg"),
            &AcquisitionConfig::default(),
        )
        .await
        .expect("png should load");

        let _ = std::fs::remove_file(&path);

        assert_eq!(staged.media_type, "image/png");
        assert_eq!((staged.width, staged.height), (32, 16));
        assert_eq!(staged.origin, ImageOrigin::PickedFile);
        assert!(staged.file_name.ends_with("ok.png"));
    }

    #[tokio::test]
    async fn rejects_missing_file() {
        let result = load_picked_file(
            &PickedFile::new(temp_path("does-not-exist.png")),
            &AcquisitionConfig::default(),
        )
        .await;

        assert!(matches!(result, Err(AcquisitionError::FileSystem(_))));
    }

    #[tokio::test]
    async fn rejects_non_image_payload() {
        let path = temp_path("notes.txt");
        std::fs::write(&path, b"<html><body>not an image</body></html>").expect("write failed");

        let result = load_picked_file(&PickedFile::new(&path), &AcquisitionConfig::default()).await;
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(AcquisitionError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn rejects_file_over_size_limit() {
        let path = temp_path("big.png");
        std::fs::write(&path, create_png_bytes(64, 64)).expect("write failed");

        let mut config = AcquisitionConfig::default();
        config.max_file_size = 16;
        let result = load_picked_file(&PickedFile::new(&path), &config).await;
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(AcquisitionError::ResourceLimit(_))));
    }

    #[test]
    fn pixel_limit_rejects_oversized_header() {
        let mut config = AcquisitionConfig::default();
        config.max_decoded_pixels = 100;

        assert!(matches!(
            validate_pixel_limits(&config, 20, 20),
            Err(AcquisitionError::ResourceLimit(_))
        ));
        assert!(validate_pixel_limits(&config, 10, 10).is_ok());
    }
}
