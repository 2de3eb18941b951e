pub mod decoder;
pub mod frame;

use anyhow::Result;

use self::frame::Frame;

/// Anything that yields decoded frames in source order.
///
/// The extraction loop only depends on this trait, so tests can drive it
/// with in-memory frames instead of a real video file.
pub trait FrameSource {
    /// Return the next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}
