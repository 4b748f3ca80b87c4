//! Depth buffer export for inspecting bakes.

use std::path::Path;

use heightscan_core::DepthBuffer;
use image::{GrayImage, Luma};

use crate::error::RenderResult;

/// Converts a depth buffer to an 8-bit grey image.
///
/// Covered texels (depth below the far plane) are stretched over the full
/// range with the nearest texel white. Uncovered texels are black.
pub fn depth_to_image(buffer: &DepthBuffer) -> GrayImage {
    let (near, far) = buffer
        .data()
        .iter()
        .copied()
        .filter(|&d| d < 1.0)
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        });
    let range = far - near;

    GrayImage::from_fn(buffer.width(), buffer.height(), |x, y| {
        let d = buffer.get(x, y).unwrap_or(1.0);
        if d >= 1.0 {
            return Luma([0]);
        }
        let t = if range > 0.0 { (d - near) / range } else { 0.0 };
        Luma([((1.0 - t) * 255.0).round() as u8])
    })
}

/// Saves a depth buffer as a greyscale image.
///
/// The format follows the file extension (PNG recommended).
pub fn save_depth_image(path: impl AsRef<Path>, buffer: &DepthBuffer) -> RenderResult<()> {
    let path = path.as_ref();
    depth_to_image(buffer).save(path)?;
    log::debug!(
        "wrote {}x{} depth image to {}",
        buffer.width(),
        buffer.height(),
        path.display()
    );
    Ok(())
}
