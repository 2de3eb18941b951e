use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::letterbox::Placement;

const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

const RECT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_SCALE: f32 = 18.0;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Renders debug copies of letterboxed frames with the content placement
/// outlined, for eyeballing the resize/padding geometry.
pub struct PlacementRenderer {
    font: Option<FontVec>,
}

impl PlacementRenderer {
    pub fn new() -> Self {
        Self { font: load_font() }
    }

    /// Save `canvas` to `dir` as a PNG with the placement rectangle drawn on.
    pub fn save_overlay(
        &self,
        canvas: &RgbImage,
        placement: Placement,
        index: u32,
        dir: &Path,
    ) -> Result<()> {
        let mut img = canvas.clone();

        let rect = Rect::at(placement.x_offset as i32, placement.y_offset as i32)
            .of_size(placement.width, placement.height);
        draw_hollow_rect_mut(&mut img, rect, RECT_COLOR);

        if let Some(font) = &self.font {
            let header = format!(
                "F:{} {}x{}+{}+{}",
                index, placement.width, placement.height, placement.x_offset, placement.y_offset
            );
            draw_text_mut(
                &mut img,
                TEXT_COLOR,
                4,
                4,
                PxScale::from(TEXT_SCALE),
                font,
                &header,
            );
        }

        let path = dir.join(format!("placement_{:08}.png", index));
        img.save(&path)
            .with_context(|| format!("failed to save debug frame to {}", path.display()))?;

        debug!(?path, "saved debug frame");
        Ok(())
    }
}

impl Default for PlacementRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn load_font() -> Option<FontVec> {
    for &path in FONT_PATHS {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!(path, "loaded debug font");
                return Some(font);
            }
            Err(e) => warn!(path, error = %e, "failed to parse font file"),
        }
    }
    warn!("no debug font found, overlays will have no text");
    None
}
