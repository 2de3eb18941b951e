use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

/// Where a resized frame lands on the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Resize target width.
    pub width: u32,
    /// Resize target height.
    pub height: u32,
    /// Left edge of the content on the canvas.
    pub x_offset: u32,
    /// Top edge of the content on the canvas.
    pub y_offset: u32,
}

/// Compute the aspect-ratio-preserving placement of a `src_w` x `src_h`
/// frame on a `final_size` square canvas.
///
/// The longer side is scaled to `final_size` and the shorter side rounded to
/// the nearest pixel. Offsets center the content; an odd padding amount
/// leaves the extra pixel on the bottom/right (offsets floor).
pub fn compute_placement(src_w: u32, src_h: u32, final_size: u32) -> Placement {
    assert!(src_w > 0 && src_h > 0, "source dimensions must be > 0");
    assert!(final_size > 0, "final_size must be > 0");

    let aspect_ratio = src_w as f64 / src_h as f64;

    let (width, height) = if aspect_ratio > 1.0 {
        // wider than tall
        let h = (final_size as f64 / aspect_ratio).round() as u32;
        (final_size, h.max(1))
    } else {
        // taller than wide, or square
        let w = (final_size as f64 * aspect_ratio).round() as u32;
        (w.max(1), final_size)
    };

    let placement = Placement {
        width,
        height,
        x_offset: (final_size - width) / 2,
        y_offset: (final_size - height) / 2,
    };

    debug!(src_w, src_h, final_size, ?placement, "computed placement");
    placement
}

/// Resize `image` preserving aspect ratio and compose it centered onto a
/// fresh black `final_size` square canvas.
pub fn letterbox(image: &RgbImage, final_size: u32) -> (RgbImage, Placement) {
    let placement = compute_placement(image.width(), image.height(), final_size);

    let resized = imageops::resize(image, placement.width, placement.height, FilterType::Triangle);

    // RgbImage::new zero-fills, which is the black padding.
    let mut canvas = RgbImage::new(final_size, final_size);
    imageops::replace(
        &mut canvas,
        &resized,
        placement.x_offset as i64,
        placement.y_offset as i64,
    );

    (canvas, placement)
}
