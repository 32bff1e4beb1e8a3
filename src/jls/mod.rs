//! JPEG-LS container: header reader, format handler and bitstream patcher.
//!
//! Marker segments are parsed natively, so detection and `read_info` work
//! without an entropy coder. Pixel data goes through a [`JpeglsCodec`].

mod codec;
pub mod header;
pub mod patch;
pub mod spiff;

pub use codec::{DecodedFrame, JpeglsCodec, NoCodec};
pub use header::{ColorTransformation, ContainerHeader, PresetCodingParameters, read_header};
pub use spiff::{
    SpiffColorSpace, SpiffCompressionType, SpiffHeader, SpiffProfileId, SpiffResolutionUnits,
};

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use enough::Stop;
use tracing::debug;

use crate::error::JlstError;
use crate::image::{Image, ImageInfo};
use crate::pixel::{FrameInfo, InterleaveMode};
use crate::registry::{FormatHandler, FormatKind};
use crate::source::Source;

/// Bytes of input examined by [`JlsFormat`] detection.
pub const DETECT_PREFIX_LEN: usize = 128;

/// Encoder settings for JPEG-LS output.
///
/// Unset options fall back to the image: its interleave mode and comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pub interleave_mode: Option<InterleaveMode>,
    /// Maximum per-sample reconstruction error; 0 is lossless.
    pub near_lossless: u8,
    pub preset_coding_parameters: Option<PresetCodingParameters>,
    /// `Some(ColorTransformation::None)` still writes the `mrfx` segment.
    pub color_transformation: Option<ColorTransformation>,
    pub standard_spiff_header: bool,
    pub comment: Option<String>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            interleave_mode: None,
            near_lossless: 0,
            preset_coding_parameters: None,
            color_transformation: None,
            standard_spiff_header: true,
            comment: None,
        }
    }
}

impl EncodeOptions {
    pub fn with_interleave_mode(mut self, mode: InterleaveMode) -> Self {
        self.interleave_mode = Some(mode);
        self
    }

    pub fn with_near_lossless(mut self, near: u8) -> Self {
        self.near_lossless = near;
        self
    }

    pub fn with_preset_coding_parameters(mut self, params: PresetCodingParameters) -> Self {
        self.preset_coding_parameters = Some(params);
        self
    }

    pub fn with_color_transformation(mut self, transformation: ColorTransformation) -> Self {
        self.color_transformation = Some(transformation);
        self
    }

    pub fn with_standard_spiff_header(mut self, enabled: bool) -> Self {
        self.standard_spiff_header = enabled;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check the options against `info` and fill in what the image implies.
    fn resolve(&self, info: &ImageInfo) -> Result<Self, JlstError> {
        let frame = &info.frame;
        if frame.component_count == 1
            && self.interleave_mode.is_some_and(|m| m != InterleaveMode::None)
        {
            return Err(JlstError::UnsupportedGeometry(
                "single-component images need interleave mode none".into(),
            ));
        }
        if self.color_transformation.is_some()
            && (frame.component_count != 3 || !matches!(frame.bits_per_sample, 8 | 16))
        {
            return Err(JlstError::UnsupportedGeometry(format!(
                "colour transformation needs 3 components at 8 or 16 bits, got {} at {}",
                frame.component_count, frame.bits_per_sample
            )));
        }
        let mut resolved = self.clone();
        resolved.interleave_mode = Some(self.interleave_mode.unwrap_or(info.interleave_mode));
        resolved.comment = match &self.comment {
            Some(c) => Some(c.clone()),
            None if info.comment.is_empty() => None,
            None => Some(info.comment.clone()),
        };
        Ok(resolved)
    }
}

/// Encode `image` with `codec`, converting its layout to the requested
/// interleave mode first.
pub(crate) fn encode_image(
    codec: &dyn JpeglsCodec,
    image: &Image,
    options: &EncodeOptions,
) -> Result<Vec<u8>, JlstError> {
    let resolved = options.resolve(&image.info)?;
    let mode = resolved.interleave_mode.unwrap_or_default();
    let pixels = image.pixels_in(mode)?;
    // Converted and planar buffers come out tightly packed.
    let repacked = image.info.frame.component_count > 1
        && (mode == InterleaveMode::None || image.info.interleave_mode == InterleaveMode::None);
    let stride = if repacked { 0 } else { image.data.stride };
    debug!(
        width = image.info.frame.width,
        height = image.info.frame.height,
        mode = ?mode,
        near = resolved.near_lossless,
        spiff = resolved.standard_spiff_header,
        "encoding JPEG-LS"
    );
    codec.encode(&image.info.frame, &resolved, &pixels, stride)
}

/// Reject SPIFF headers that disagree with the frame or describe data
/// this crate cannot carry.
fn check_spiff(header: &ContainerHeader) -> Result<(), JlstError> {
    let Some(spiff) = &header.spiff else {
        return Ok(());
    };
    if !spiff.matches_frame(&header.frame) {
        return Err(JlstError::InconsistentContainer(format!(
            "SPIFF header {}x{} ({} bits, {} components) vs frame {:?}",
            spiff.width, spiff.height, spiff.bits_per_sample, spiff.component_count, header.frame
        )));
    }
    if !matches!(
        spiff.color_space,
        SpiffColorSpace::Grayscale | SpiffColorSpace::Rgb
    ) {
        return Err(JlstError::InconsistentContainer(format!(
            "unhandled SPIFF colour space {}",
            spiff.color_space
        )));
    }
    if spiff.color_space.component_count() != Some(spiff.component_count) {
        return Err(JlstError::InconsistentContainer(format!(
            "SPIFF colour space {} with {} components",
            spiff.color_space, spiff.component_count
        )));
    }
    if spiff.compression_type != SpiffCompressionType::JpegLs {
        return Err(JlstError::InconsistentContainer(format!(
            "SPIFF compression type {}",
            spiff.compression_type
        )));
    }
    Ok(())
}

/// The codec's output must describe `frame` and fill it exactly.
pub(crate) fn check_decoded(decoded: &DecodedFrame, frame: &FrameInfo) -> Result<(), JlstError> {
    if decoded.frame != *frame {
        return Err(JlstError::InconsistentContainer(format!(
            "decoder reported {:?}, header declared {:?}",
            decoded.frame, frame
        )));
    }
    let needed = decoded.frame.buffer_len()?;
    if decoded.pixels.len() != needed {
        return Err(JlstError::BufferTooSmall {
            needed,
            actual: decoded.pixels.len(),
        });
    }
    Ok(())
}

/// JPEG-LS format handler.
#[derive(Clone, Debug, Default)]
pub struct JlsFormat<C> {
    codec: C,
}

impl<C: JpeglsCodec> JlsFormat<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: JpeglsCodec> FormatHandler for JlsFormat<C> {
    fn kind(&self) -> FormatKind {
        FormatKind::Jls
    }

    fn name(&self) -> &'static str {
        "jls"
    }

    fn handle_type(&self, format_type: &str) -> bool {
        format_type.eq_ignore_ascii_case("jls")
    }

    fn detect(&self, source: &mut Source<'_>, _hints: &ImageInfo) -> bool {
        let prefix = source.read(DETECT_PREFIX_LEN);
        match read_header(prefix) {
            Ok(_) => true,
            // marker segments continue past the prefix
            Err(JlstError::UnexpectedEof) => prefix.len() == DETECT_PREFIX_LEN,
            Err(_) => false,
        }
    }

    fn read_info(&self, source: &mut Source<'_>, image: &mut Image) -> Result<(), JlstError> {
        let header = read_header(source.bytes())?;
        check_spiff(&header)?;
        image.info = ImageInfo::new(header.frame, header.interleave_mode)
            .with_comment(header.comment);
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
        stop.check()?;
        let decoded = self.codec.decode(source.read_to_end())?;
        check_decoded(&decoded, &image.info.frame)?;
        image.info.interleave_mode = decoded.interleave_mode;
        image.data.pixels = decoded.pixels;
        Ok(())
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
        options: &EncodeOptions,
        stop: &dyn Stop,
    ) -> Result<(), JlstError> {
        stop.check()?;
        let encoded = encode_image(&self.codec, image, options)?;
        dest.extend_from_slice(&encoded);
        Ok(())
    }
}
