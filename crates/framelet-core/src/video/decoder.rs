use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::{bail, Context, Result};
use image::RgbImage;
use tracing::{debug, error, info, warn};

use super::frame::Frame;
use super::FrameSource;

/// Stream metadata obtained by probing with ffprobe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

/// Parse ffprobe's `csv=p=0` output for `width,height,r_frame_rate`.
/// The frame rate is usually a rational like `30000/1001`.
fn parse_probe_output(stdout: &str) -> Result<StreamInfo> {
    let parts: Vec<&str> = stdout.trim().split(',').collect();
    if parts.len() < 3 {
        bail!("unexpected ffprobe output, expected width,height,fps: {stdout}");
    }

    let width: u32 = parts[0].parse().context("failed to parse width")?;
    let height: u32 = parts[1].parse().context("failed to parse height")?;

    let fps = match parts[2].split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().context("failed to parse fps numerator")?;
            let den: f64 = den.parse().context("failed to parse fps denominator")?;
            if den > 0.0 {
                num / den
            } else {
                0.0
            }
        }
        None => parts[2].parse().context("failed to parse fps")?,
    };

    Ok(StreamInfo { width, height, fps })
}

fn probe(path: &Path) -> Result<StreamInfo> {
    info!(?path, "probing video metadata with ffprobe");

    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height,r_frame_rate",
            "-of", "csv=p=0",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context("failed to run ffprobe — is ffmpeg installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(%stderr, ?path, "ffprobe failed");
        bail!("ffprobe failed: {stderr}");
    }

    let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout))?;

    if info.width == 0 || info.height == 0 {
        bail!("invalid video dimensions: {}x{}", info.width, info.height);
    }
    if info.fps <= 0.0 {
        warn!(fps = info.fps, ?path, "non-positive fps, timestamps will be 0.0");
    }

    info!(
        width = info.width,
        height = info.height,
        fps = info.fps,
        "probe completed"
    );
    Ok(info)
}

/// Decodes video frames by piping raw RGB24 data from the ffmpeg CLI.
///
/// The child process is killed and reaped on drop, so the decoding handle is
/// released on every exit path regardless of how many frames were read.
pub struct VideoDecoder {
    child: Child,
    info: StreamInfo,
    frames_read: u32,
    frame_bytes: usize,
}

impl VideoDecoder {
    /// Open a video file for decoding.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("video file does not exist: {}", path.display());
        }

        let info = probe(path)?;

        info!(?path, "spawning ffmpeg decoder process");

        let child = Command::new("ffmpeg")
            .arg("-i")
            .arg(path)
            .args([
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-v", "error",
                "pipe:1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn ffmpeg — is ffmpeg installed?")?;

        let frame_bytes = (info.width as usize) * (info.height as usize) * 3;

        Ok(Self {
            child,
            info,
            frames_read: 0,
            frame_bytes,
        })
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn fps(&self) -> f64 {
        self.info.fps
    }

    /// Fill `buf` from the ffmpeg pipe. Returns the number of bytes read,
    /// which is short only when the stream ends.
    fn read_frame_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        let stdout = self
            .child
            .stdout
            .as_mut()
            .context("ffmpeg stdout not available")?;

        let mut read = 0;
        while read < buf.len() {
            match stdout.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) => {
                    error!(frame = self.frames_read, %e, "failed to read from ffmpeg pipe");
                    return Err(e).context("failed to read from ffmpeg pipe");
                }
            }
        }
        Ok(read)
    }
}

impl FrameSource for VideoDecoder {
    /// Read the next frame, or `None` once the stream is exhausted.
    ///
    /// A stream that ends mid-frame (truncated file, codec error) is logged
    /// and treated as end-of-stream rather than surfaced as an error.
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut buf = vec![0u8; self.frame_bytes];

        let read = self.read_frame_bytes(&mut buf)?;
        if read == 0 {
            info!(total_frames = self.frames_read, "video stream ended");
            return Ok(None);
        }
        if read < self.frame_bytes {
            warn!(
                read_bytes = read,
                expected_bytes = self.frame_bytes,
                frame = self.frames_read,
                "stream ended mid-frame, dropping partial frame"
            );
            return Ok(None);
        }

        let image = RgbImage::from_raw(self.info.width, self.info.height, buf)
            .context("failed to create RgbImage from raw frame data")?;

        let frame_number = self.frames_read;
        let timestamp_seconds = if self.info.fps > 0.0 {
            frame_number as f64 / self.info.fps
        } else {
            0.0
        };
        self.frames_read += 1;

        debug!(frame_number, timestamp_seconds, "decoded frame");

        Ok(Some(Frame {
            image,
            frame_number,
            timestamp_seconds,
        }))
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        info!(total_frames = self.frames_read, "closing video decoder");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
