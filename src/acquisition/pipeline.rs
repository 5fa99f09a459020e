//! # 相机帧编码流水线模块
//!
//! ## 设计思路
//!
//! 相机交出的是已解码的整帧像素，上传前需要压成常见栅格格式（JPEG）。
//! 编码是 CPU 密集操作，放到阻塞线程池执行，会话侧只在此处挂起等待。
//!
//! ## 实现思路
//!
//! 1. 空帧直接拒绝
//! 2. 超过单边上限时降采样（优先 `fast_image_resize`，失败回退 `resize_exact`）
//! 3. 转 RGB 后按配置质量编码 JPEG

use bytes::Bytes;
use chrono::Local;
use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};

use super::config::ResizeFilter;
use super::source::{ImageOrigin, StagedImage};
use super::{AcquisitionConfig, AcquisitionError};

/// 快照上传时使用的媒体类型。
pub const SNAPSHOT_MEDIA_TYPE: &str = "image/jpeg";

/// 在阻塞线程池中编码相机帧。
pub(crate) async fn encode_camera_frame(
    frame: DynamicImage,
    config: &AcquisitionConfig,
) -> Result<StagedImage, AcquisitionError> {
    let config = config.clone();

    tokio::task::spawn_blocking(move || encode_frame_blocking(frame, &config))
        .await
        .map_err(|e| AcquisitionError::Encode(format!("encoder task failed: {e}")))?
}

pub(crate) fn encode_frame_blocking(
    frame: DynamicImage,
    config: &AcquisitionConfig,
) -> Result<StagedImage, AcquisitionError> {
    let (raw_width, raw_height) = frame.dimensions();
    if raw_width == 0 || raw_height == 0 {
        return Err(AcquisitionError::Encode("captured frame is empty".to_string()));
    }

    let frame = downscale_to_fit(frame, config.max_dimension, config.resize_filter)?;
    let (width, height) = frame.dimensions();

    let rgb = frame.to_rgb8();
    let mut buffer = Vec::with_capacity((width as usize) * (height as usize) / 4);
    JpegEncoder::new_with_quality(&mut buffer, config.jpeg_quality)
        .encode_image(&rgb)
        .map_err(|e| AcquisitionError::Encode(e.to_string()))?;

    if buffer.is_empty() {
        return Err(AcquisitionError::Encode("encoder produced no bytes".to_string()));
    }

    log::info!(
        "📸 相机帧编码完成 - 原始尺寸: {}x{} 输出尺寸: {}x{} 体积: {} bytes",
        raw_width,
        raw_height,
        width,
        height,
        buffer.len()
    );

    let captured_at = Local::now();
    Ok(StagedImage {
        bytes: Bytes::from(buffer),
        media_type: SNAPSHOT_MEDIA_TYPE.to_string(),
        file_name: format!("capture_{}.jpg", captured_at.format("%Y%m%d_%H%M%S")),
        origin: ImageOrigin::Camera,
        width,
        height,
        captured_at,
    })
}

/// 按单边上限等比降采样；未超限时原样返回。
fn downscale_to_fit(
    image: DynamicImage,
    max_dimension: u32,
    filter: ResizeFilter,
) -> Result<DynamicImage, AcquisitionError> {
    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return Ok(image);
    }

    let scale = (max_dimension as f64 / width as f64).min(max_dimension as f64 / height as f64);
    let target_width = ((width as f64 * scale).floor() as u32).max(1);
    let target_height = ((height as f64 * scale).floor() as u32).max(1);

    log::info!(
        "🧩 相机帧降采样：{}x{} -> {}x{}（filter={:?}）",
        width,
        height,
        target_width,
        target_height,
        filter
    );

    match resize_with_fast_image_resize(&image, target_width, target_height, filter) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!("⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}", err);
            Ok(image.resize_exact(target_width, target_height, filter.to_image_filter()))
        }
    }
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    filter: ResizeFilter,
) -> Result<DynamicImage, AcquisitionError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image =
        fr::images::Image::from_vec_u8(src_width, src_height, src.into_raw(), fr::PixelType::U8x4)
            .map_err(|e| AcquisitionError::Encode(format!("source buffer: {e}")))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(filter.to_fast_filter()));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| AcquisitionError::Encode(format!("resize: {e}")))?;

    let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
        target_width,
        target_height,
        dst_image.into_vec(),
    )
    .ok_or_else(|| AcquisitionError::Encode("resized buffer has unexpected length".to_string()))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn frame(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 255) as u8, (y % 255) as u8, 128])
        }))
    }

    #[test]
    fn encodes_small_frame_as_jpeg_without_resizing() {
        let staged = encode_frame_blocking(frame(320, 240), &AcquisitionConfig::default())
            .expect("encode should succeed");

        assert_eq!(staged.media_type, SNAPSHOT_MEDIA_TYPE);
        assert_eq!((staged.width, staged.height), (320, 240));
        assert_eq!(staged.origin, ImageOrigin::Camera);
        assert_eq!(infer::get(&staged.bytes).map(|k| k.mime_type()), Some("image/jpeg"));
    }

    #[test]
    fn downscales_frame_over_max_dimension_keeping_aspect() {
        let mut config = AcquisitionConfig::default();
        config.max_dimension = 200;

        let staged = encode_frame_blocking(frame(800, 400), &config).expect("encode should succeed");

        assert_eq!((staged.width, staged.height), (200, 100));
    }

    #[test]
    fn rejects_empty_frame() {
        let result = encode_frame_blocking(
            DynamicImage::ImageRgb8(RgbImage::new(0, 0)),
            &AcquisitionConfig::default(),
        );

        assert!(matches!(result, Err(AcquisitionError::Encode(_))));
    }

    #[tokio::test]
    async fn encodes_on_blocking_worker() {
        let staged = encode_camera_frame(frame(64, 48), &AcquisitionConfig::default())
            .await
            .expect("encode should succeed");

        assert!(staged.file_name.starts_with("capture_"));
        assert!(staged.file_name.ends_with(".jpg"));
    }
}
