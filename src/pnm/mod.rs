//! Binary PNM: P5 (PGM, grayscale) and P6 (PPM, RGB).
//!
//! Headers are line oriented: magic, optional `#` comment lines,
//! `width height`, then maxval. Samples wider than 8 bits are big-endian on
//! disk and little-endian in memory.

mod decode;
mod encode;

use alloc::vec::Vec;
use enough::Stop;

use crate::error::JlstError;
use crate::image::{Image, ImageInfo};
use crate::jls::EncodeOptions;
use crate::registry::{FormatHandler, FormatKind};
use crate::source::Source;

/// How a stored comment is written back as `#` lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommentStyle {
    /// One `#` line per comment line, text kept verbatim.
    #[default]
    Lines,
    /// One `#` line per whitespace-separated token. Collapses runs of
    /// spaces; matches files written by older tools.
    Tokens,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PnmOptions {
    /// Strip surrounding whitespace from each comment line when reading.
    pub trim_comments: bool,
    pub comment_style: CommentStyle,
}

impl PnmOptions {
    pub fn with_trim_comments(mut self, trim: bool) -> Self {
        self.trim_comments = trim;
        self
    }

    pub fn with_comment_style(mut self, style: CommentStyle) -> Self {
        self.comment_style = style;
        self
    }
}

/// PNM format handler.
#[derive(Clone, Debug, Default)]
pub struct PnmFormat {
    options: PnmOptions,
}

impl PnmFormat {
    pub fn new(options: PnmOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PnmOptions {
        &self.options
    }
}

impl FormatHandler for PnmFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Pnm
    }

    fn name(&self) -> &'static str {
        "pnm"
    }

    fn handle_type(&self, format_type: &str) -> bool {
        ["pgm", "ppm", "pnm"]
            .iter()
            .any(|t| t.eq_ignore_ascii_case(format_type))
    }

    fn detect(&self, source: &mut Source<'_>, _hints: &ImageInfo) -> bool {
        source.peek() == Some(b'P')
    }

    fn read_info(&self, source: &mut Source<'_>, image: &mut Image) -> Result<(), JlstError> {
        let header = decode::parse_header(source, &self.options)?;
        image.info = header;
        image.data.stride = 0;
        Ok(())
    }

    fn read_data(
        &self,
        source: &mut Source<'_>,
        image: &mut Image,
        stop: &dyn Stop,
    ) -> Result<(), JlstError> {
        decode::read_samples(source, image, stop)
    }

    fn write_info(
        &self,
        dest: &mut Vec<u8>,
        image: &Image,
        _options: &EncodeOptions,
    ) -> Result<(), JlstError> {
        encode::write_header(dest, &image.info, self.options.comment_style)
    }

    fn write_data(
        &self,
        dest: &mut Vec<u8>,
        image: &Image,
        _options: &EncodeOptions,
        stop: &dyn Stop,
    ) -> Result<(), JlstError> {
        encode::write_samples(dest, image, stop)
    }
}
