use alloc::string::String;
use alloc::vec::Vec;

use super::EncodeOptions;
use crate::error::JlstError;
use crate::pixel::{FrameInfo, InterleaveMode};

/// A decoded JPEG-LS frame as produced by the entropy decoder.
///
/// Pixels are tightly packed: planar for [`InterleaveMode::None`],
/// pixel-interleaved otherwise, with 2-byte samples little-endian.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    pub frame: FrameInfo,
    pub interleave_mode: InterleaveMode,
    pub comment: String,
    pub pixels: Vec<u8>,
}

/// The JPEG-LS entropy coder.
///
/// Container handling, pixel layout and bitstream patching live in this
/// crate; implementations only turn samples into a complete JPEG-LS stream
/// and back.
pub trait JpeglsCodec: Send + Sync {
    /// Encode `pixels` laid out as `options.interleave_mode` says, with
    /// `stride` bytes between interleaved scanlines (0 for tightly packed).
    ///
    /// The options arrive resolved: the interleave mode is always set and
    /// `comment` holds the text to store, if any. A SPIFF header is
    /// expected when `standard_spiff_header` is set.
    fn encode(
        &self,
        frame: &FrameInfo,
        options: &EncodeOptions,
        pixels: &[u8],
        stride: usize,
    ) -> Result<Vec<u8>, JlstError>;

    fn decode(&self, encoded: &[u8]) -> Result<DecodedFrame, JlstError>;
}

impl<C: JpeglsCodec + ?Sized> JpeglsCodec for &C {
    fn encode(
        &self,
        frame: &FrameInfo,
        options: &EncodeOptions,
        pixels: &[u8],
        stride: usize,
    ) -> Result<Vec<u8>, JlstError> {
        (**self).encode(frame, options, pixels, stride)
    }

    fn decode(&self, encoded: &[u8]) -> Result<DecodedFrame, JlstError> {
        (**self).decode(encoded)
    }
}

/// Placeholder for header-only work.
///
/// Detection, `read_info` and `fix_jai` never reach the codec; anything
/// that does fails with [`JlstError::Unimplemented`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCodec;

impl JpeglsCodec for NoCodec {
    fn encode(
        &self,
        _frame: &FrameInfo,
        _options: &EncodeOptions,
        _pixels: &[u8],
        _stride: usize,
    ) -> Result<Vec<u8>, JlstError> {
        Err(JlstError::Unimplemented("JPEG-LS encoding without a codec"))
    }

    fn decode(&self, _encoded: &[u8]) -> Result<DecodedFrame, JlstError> {
        Err(JlstError::Unimplemented("JPEG-LS decoding without a codec"))
    }
}
