use image::RgbImage;

/// A single decoded video frame.
pub struct Frame {
    /// The frame's pixel data, 3-channel RGB.
    pub image: RgbImage,
    /// 0-based position of this frame in the source stream.
    pub frame_number: u32,
    /// Elapsed seconds from the start of the source (0.0 when fps is unknown).
    pub timestamp_seconds: f64,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
