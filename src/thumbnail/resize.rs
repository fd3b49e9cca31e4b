use crate::{ImageError, ImageResult};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Fits an image inside a `width` x `height` box
///
/// The source is scaled to the largest size that fits the box while keeping
/// its aspect ratio, centred, and padded with fully transparent pixels. The
/// output is always a PNG of exactly `width` x `height`; nothing is cropped.
///
/// # Arguments
///
/// * `source` - Encoded source image (any format the decoder supports)
/// * `width` - Target box width in pixels
/// * `height` - Target box height in pixels
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PNG-encoded thumbnail
/// * `Err(ImageError)` - Empty or corrupt input, or an invalid target box
pub fn resize_contain(source: &[u8], width: u32, height: u32) -> ImageResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidTarget { width, height });
    }
    if source.is_empty() {
        return Err(ImageError::EmptyInput);
    }

    let decoded =
        image::load_from_memory(source).map_err(|e| ImageError::Decode(e.to_string()))?;

    let (src_w, src_h) = (decoded.width(), decoded.height());
    if src_w == 0 || src_h == 0 {
        return Err(ImageError::EmptyInput);
    }

    let (fit_w, fit_h) = fit_dimensions(src_w, src_h, width, height);
    let resized = decoded
        .resize_exact(fit_w, fit_h, FilterType::Lanczos3)
        .to_rgba8();

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let x = i64::from((width - fit_w) / 2);
    let y = i64::from((height - fit_h) / 2);
    imageops::overlay(&mut canvas, &resized, x, y);

    let mut out = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    tracing::debug!(
        "Resized {}x{} capture into {}x{} box ({}x{} content)",
        src_w,
        src_h,
        width,
        height,
        fit_w,
        fit_h
    );

    Ok(out)
}

/// Runs `resize_contain` on the blocking thread pool
pub async fn resize_contain_blocking(
    source: Vec<u8>,
    width: u32,
    height: u32,
) -> ImageResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || resize_contain(&source, width, height))
        .await
        .map_err(|e| ImageError::Task(e.to_string()))?
}

/// Largest size with the source's aspect ratio that fits the box
fn fit_dimensions(src_w: u32, src_h: u32, box_w: u32, box_h: u32) -> (u32, u32) {
    let scale = f64::min(
        f64::from(box_w) / f64::from(src_w),
        f64::from(box_h) / f64::from(src_h),
    );

    let w = (f64::from(src_w) * scale).round() as u32;
    let h = (f64::from(src_h) * scale).round() as u32;

    (w.clamp(1, box_w), h.clamp(1, box_h))
}
