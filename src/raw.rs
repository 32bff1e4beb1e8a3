//! Headerless sample dumps.
//!
//! Geometry comes from caller hints; bit depth and component count may be
//! inferred from the input size. 2-byte samples are big-endian on disk.

use alloc::format;
use alloc::vec::Vec;

use enough::Stop;
use tracing::debug;

use crate::error::JlstError;
use crate::image::{Image, ImageInfo};
use crate::jls::EncodeOptions;
use crate::pixel::{FrameInfo, InterleaveMode};
use crate::registry::{FormatHandler, FormatKind};
use crate::source::Source;

/// On-disk ordering of 3-component RAW data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlanarConfiguration {
    /// RGBRGB...
    #[default]
    Contiguous,
    /// All R, then all G, then all B.
    Separate,
}

impl PlanarConfiguration {
    fn interleave_mode(self) -> InterleaveMode {
        match self {
            Self::Contiguous => InterleaveMode::Sample,
            Self::Separate => InterleaveMode::None,
        }
    }
}

/// Fill in the bit depth and component count a caller left at 0.
///
/// When `file_size` is a multiple of `width * height`, the quotient picks
/// 16 bits if even (else 8) and 3 components if divisible by 3 (else 1).
/// Pinned fields are never changed.
pub fn compute_info(file_size: usize, hints: &FrameInfo) -> FrameInfo {
    let mut frame = *hints;
    let pixels = hints.width as usize * hints.height as usize;
    if pixels == 0 || file_size % pixels != 0 {
        return frame;
    }
    let mult = file_size / pixels;
    if frame.bits_per_sample == 0 {
        frame.bits_per_sample = if mult % 2 == 0 { 16 } else { 8 };
    }
    if frame.component_count == 0 {
        frame.component_count = if mult % 3 == 0 { 3 } else { 1 };
    }
    frame
}

fn matches_size(frame: &FrameInfo, file_size: usize) -> bool {
    (1..=16).contains(&frame.bits_per_sample)
        && frame.component_count > 0
        && frame.buffer_len().is_ok_and(|len| len == file_size)
}

/// RAW format handler.
#[derive(Clone, Debug, Default)]
pub struct RawFormat {
    planar_configuration: PlanarConfiguration,
}

impl RawFormat {
    pub fn with_planar_configuration(mut self, planar_configuration: PlanarConfiguration) -> Self {
        self.planar_configuration = planar_configuration;
        self
    }

    pub fn planar_configuration(&self) -> PlanarConfiguration {
        self.planar_configuration
    }
}

impl FormatHandler for RawFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Raw
    }

    fn name(&self) -> &'static str {
        "raw"
    }

    fn handle_type(&self, format_type: &str) -> bool {
        format_type.eq_ignore_ascii_case("raw")
    }

    fn detect(&self, source: &mut Source<'_>, hints: &ImageInfo) -> bool {
        if hints.frame.width == 0 || hints.frame.height == 0 {
            return false;
        }
        matches_size(&compute_info(source.size(), &hints.frame), source.size())
    }

    fn read_info(&self, source: &mut Source<'_>, image: &mut Image) -> Result<(), JlstError> {
        let hints = image.info.frame;
        if hints.width == 0 || hints.height == 0 {
            return Err(JlstError::MissingSize);
        }
        let frame = compute_info(source.size(), &hints);
        if !matches_size(&frame, source.size()) {
            return Err(JlstError::MalformedHeader(format!(
                "{}x{} at {} bits, {} components does not describe {} bytes",
                frame.width,
                frame.height,
                frame.bits_per_sample,
                frame.component_count,
                source.size()
            )));
        }
        debug!(
            width = frame.width,
            height = frame.height,
            bits = frame.bits_per_sample,
            components = frame.component_count,
            "resolved raw geometry"
        );
        image.info.frame = frame;
        image.info.interleave_mode = match frame.component_count {
            3 => self.planar_configuration.interleave_mode(),
            _ => InterleaveMode::None,
        };
        image.data.stride = 0;
        Ok(())
    }

    fn read_data(
        &self,
        source: &mut Source<'_>,
        image: &mut Image,
        stop: &dyn Stop,
    ) -> Result<(), JlstError> {
        source.rewind();
        let body = source.read_exact(image.data.pixels.len())?;
        image.read_big_endian(body, stop)
    }

    fn write_info(
        &self,
        _dest: &mut Vec<u8>,
        _image: &Image,
        _options: &EncodeOptions,
    ) -> Result<(), JlstError> {
        Ok(())
    }

    fn write_data(
        &self,
        dest: &mut Vec<u8>,
        image: &Image,
        _options: &EncodeOptions,
        stop: &dyn Stop,
    ) -> Result<(), JlstError> {
        let current = image.info.interleave_mode;
        let target = match self.planar_configuration {
            PlanarConfiguration::Separate => InterleaveMode::None,
            PlanarConfiguration::Contiguous if current == InterleaveMode::None => {
                InterleaveMode::Sample
            }
            PlanarConfiguration::Contiguous => current,
        };
        image.write_big_endian(target, dest, stop)
    }
}
