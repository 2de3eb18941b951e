use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::debug::PlacementRenderer;
use crate::letterbox;
use crate::video::decoder::VideoDecoder;
use crate::video::FrameSource;

/// Parameters for a frame-extraction run.
pub struct ExtractConfig {
    /// Side length of the square output canvas, in pixels.
    pub final_size: u32,
    /// Output files are named `<prefix>_<index>.jpg`.
    pub prefix: String,
    /// Keep every Nth decoded frame (1 = every frame).
    pub sample_rate: u32,
    /// Maximum number of frames to write, or None for the entire video.
    pub max_frames: Option<u32>,
    /// Directory to write placement-overlay debug images, or None to skip.
    pub debug_frames_dir: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            final_size: 1024,
            prefix: "frame".to_string(),
            sample_rate: 1,
            max_frames: None,
            debug_frames_dir: None,
        }
    }
}

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractReport {
    /// Frames successfully decoded from the source.
    pub frames_decoded: u32,
    /// Frames letterboxed and written to disk.
    pub frames_written: u32,
}

/// Extract `input` into a directory of letterboxed square images.
///
/// Each decoded frame is resized preserving aspect ratio, padded onto a
/// black `final_size` square canvas, and written as
/// `<output_dir>/<prefix>_<index>.jpg` with a gapless 0-based index.
pub fn run_extract(
    input: &Path,
    output_dir: &Path,
    config: &ExtractConfig,
) -> Result<ExtractReport> {
    validate_config(config)?;

    info!(
        ?input,
        ?output_dir,
        final_size = config.final_size,
        sample_rate = config.sample_rate,
        max_frames = ?config.max_frames,
        "extraction starting"
    );

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let mut decoder = VideoDecoder::open(input).context("failed to open video")?;
    let report = extract_frames(&mut decoder, output_dir, config)?;

    info!(
        frames_decoded = report.frames_decoded,
        frames_written = report.frames_written,
        "extraction complete"
    );
    Ok(report)
}

fn validate_config(config: &ExtractConfig) -> Result<()> {
    if config.final_size < 1 {
        bail!("final_size must be >= 1, got {}", config.final_size);
    }
    if config.sample_rate < 1 {
        bail!("sample_rate must be >= 1, got {}", config.sample_rate);
    }
    if config.prefix.is_empty() {
        bail!("prefix must not be empty");
    }
    Ok(())
}

/// Drain `source` and write one letterboxed image per kept frame.
///
/// The write index increments only on written frames, so output names stay
/// gapless even when `sample_rate` skips decoded frames. A write failure is
/// fatal: skipping would break the index's meaning of "frames written".
fn extract_frames(
    source: &mut dyn FrameSource,
    output_dir: &Path,
    config: &ExtractConfig,
) -> Result<ExtractReport> {
    let renderer = match &config.debug_frames_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("failed to create debug frames directory {}", dir.display())
            })?;
            Some(PlacementRenderer::new())
        }
        None => None,
    };

    let mut frames_decoded: u32 = 0;
    let mut frames_written: u32 = 0;

    loop {
        if let Some(max) = config.max_frames {
            if frames_written >= max {
                info!(max_frames = max, "frame cap reached");
                break;
            }
        }

        let Some(frame) = source.next_frame()? else {
            break;
        };
        frames_decoded += 1;

        if frame.frame_number % config.sample_rate != 0 {
            continue;
        }

        let (canvas, placement) = letterbox::letterbox(&frame.image, config.final_size);

        let path = output_dir.join(format!("{}_{}.jpg", config.prefix, frames_written));
        canvas
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!(
            index = frames_written,
            frame_number = frame.frame_number,
            src_w = frame.width(),
            src_h = frame.height(),
            ?placement,
            "wrote frame"
        );

        if let (Some(renderer), Some(dir)) = (&renderer, &config.debug_frames_dir) {
            renderer
                .save_overlay(&canvas, placement, frames_written, dir)
                .context("failed to save debug frame")?;
        }

        frames_written += 1;
    }

    Ok(ExtractReport {
        frames_decoded,
        frames_written,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use image::{Rgb, RgbImage};
    use tracing_test::traced_test;

    use super::*;
    use crate::video::frame::Frame;

    /// FrameSource backed by a fixed list of in-memory images.
    struct StubSource {
        frames: Vec<RgbImage>,
        next: u32,
    }

    impl StubSource {
        fn new(frames: Vec<RgbImage>) -> Self {
            Self { frames, next: 0 }
        }
    }

    impl FrameSource for StubSource {
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            let Some(image) = self.frames.get(self.next as usize) else {
                return Ok(None);
            };
            let frame = Frame {
                image: image.clone(),
                frame_number: self.next,
                timestamp_seconds: self.next as f64 / 30.0,
            };
            self.next += 1;
            Ok(Some(frame))
        }
    }

    fn temp_output_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("framelet-test-{}-{}", std::process::id(), tag));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn solid_frames(count: usize, w: u32, h: u32) -> Vec<RgbImage> {
        (0..count)
            .map(|i| RgbImage::from_pixel(w, h, Rgb([i as u8 * 10, 0, 0])))
            .collect()
    }

    fn written_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    #[traced_test]
    fn writes_one_file_per_frame_with_gapless_indices() {
        let dir = temp_output_dir("gapless");
        let mut source = StubSource::new(solid_frames(3, 64, 36));
        let config = ExtractConfig {
            final_size: 32,
            ..Default::default()
        };

        let report = extract_frames(&mut source, &dir, &config).unwrap();

        assert_eq!(report.frames_decoded, 3);
        assert_eq!(report.frames_written, 3);
        assert_eq!(
            written_files(&dir),
            vec!["frame_0.jpg", "frame_1.jpg", "frame_2.jpg"]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    #[traced_test]
    fn empty_source_writes_nothing() {
        let dir = temp_output_dir("empty");
        let mut source = StubSource::new(Vec::new());
        let config = ExtractConfig::default();

        let report = extract_frames(&mut source, &dir, &config).unwrap();

        assert_eq!(report.frames_decoded, 0);
        assert_eq!(report.frames_written, 0);
        assert!(written_files(&dir).is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    #[traced_test]
    fn sampling_keeps_every_nth_frame_without_index_gaps() {
        let dir = temp_output_dir("sampling");
        let mut source = StubSource::new(solid_frames(5, 40, 40));
        let config = ExtractConfig {
            final_size: 16,
            sample_rate: 2,
            ..Default::default()
        };

        let report = extract_frames(&mut source, &dir, &config).unwrap();

        // frames 0, 2, 4 kept, still named 0..2
        assert_eq!(report.frames_decoded, 5);
        assert_eq!(report.frames_written, 3);
        assert_eq!(
            written_files(&dir),
            vec!["frame_0.jpg", "frame_1.jpg", "frame_2.jpg"]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    #[traced_test]
    fn max_frames_caps_output() {
        let dir = temp_output_dir("cap");
        let mut source = StubSource::new(solid_frames(10, 20, 20));
        let config = ExtractConfig {
            final_size: 16,
            max_frames: Some(4),
            ..Default::default()
        };

        let report = extract_frames(&mut source, &dir, &config).unwrap();

        assert_eq!(report.frames_written, 4);
        assert_eq!(written_files(&dir).len(), 4);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    #[traced_test]
    fn custom_prefix_is_used_in_names() {
        let dir = temp_output_dir("prefix");
        let mut source = StubSource::new(solid_frames(1, 30, 20));
        let config = ExtractConfig {
            final_size: 16,
            prefix: "train4".to_string(),
            ..Default::default()
        };

        extract_frames(&mut source, &dir, &config).unwrap();

        assert_eq!(written_files(&dir), vec!["train4_0.jpg"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    #[traced_test]
    fn debug_dir_gets_one_overlay_per_written_frame() {
        let dir = temp_output_dir("debug-out");
        let debug_dir = temp_output_dir("debug-overlays");
        let mut source = StubSource::new(solid_frames(2, 64, 36));
        let config = ExtractConfig {
            final_size: 32,
            debug_frames_dir: Some(debug_dir.clone()),
            ..Default::default()
        };

        let report = extract_frames(&mut source, &dir, &config).unwrap();

        assert_eq!(report.frames_written, 2);
        assert_eq!(written_files(&debug_dir).len(), 2);

        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::remove_dir_all(&debug_dir).unwrap();
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let config = ExtractConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_final_size() {
        let config = ExtractConfig {
            final_size: 0,
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_empty_prefix() {
        let config = ExtractConfig {
            prefix: String::new(),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
