use crate::error::JlstError;
use crate::pixel::FrameInfo;
use alloc::format;

/// Resource limits applied before a pixel buffer is allocated.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum size in bytes of one image's pixel buffer.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    pub fn with_max_size(mut self, width: u64, height: u64) -> Self {
        self.max_width = Some(width);
        self.max_height = Some(height);
        self
    }

    pub fn with_max_pixels(mut self, pixels: u64) -> Self {
        self.max_pixels = Some(pixels);
        self
    }

    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Check a frame's geometry and the buffer it implies.
    pub(crate) fn check(&self, frame: &FrameInfo) -> Result<(), JlstError> {
        let width = u64::from(frame.width);
        let height = u64::from(frame.height);
        if let Some(max_w) = self.max_width.filter(|&m| width > m) {
            return Err(JlstError::LimitExceeded(format!(
                "width {width} exceeds limit {max_w}"
            )));
        }
        if let Some(max_h) = self.max_height.filter(|&m| height > m) {
            return Err(JlstError::LimitExceeded(format!(
                "height {height} exceeds limit {max_h}"
            )));
        }
        let pixels = width * height;
        if let Some(max_px) = self.max_pixels.filter(|&m| pixels > m) {
            return Err(JlstError::LimitExceeded(format!(
                "pixel count {pixels} exceeds limit {max_px}"
            )));
        }
        self.check_memory(frame.buffer_len()?)
    }

    pub(crate) fn check_memory(&self, bytes: usize) -> Result<(), JlstError> {
        match self.max_memory_bytes {
            Some(max_mem) if bytes as u64 > max_mem => Err(JlstError::LimitExceeded(format!(
                "allocation {bytes} bytes exceeds memory limit {max_mem}"
            ))),
            _ => Ok(()),
        }
    }
}
