use alloc::vec::Vec;

use enough::Stop;
use tracing::debug;

use crate::error::JlstError;
use crate::image::{Image, ImageInfo};
use crate::jls::EncodeOptions;
use crate::limits::Limits;
use crate::registry::Registry;
use crate::source::Source;

/// Load an image through a [`Registry`].
///
/// Without an explicit type the format is detected from the content.
/// Hints seed headerless formats (RAW needs at least width and height).
///
/// ```
/// use zenjlst::{ImageInfo, LoadRequest, Registry, Unstoppable, jls::NoCodec};
///
/// let registry = Registry::builtin(NoCodec);
/// let image = LoadRequest::new(b"P5\n2 1\n255\n\x0a\x14")
///     .load(&registry, Unstoppable)?;
/// assert_eq!(image.pixels(), [10, 20]);
///
/// let raw = LoadRequest::new(&[0u8; 12])
///     .with_hints(ImageInfo::hints(2, 2))
///     .load(&registry, Unstoppable)?;
/// assert_eq!(raw.info.frame.component_count, 3);
/// # Ok::<(), zenjlst::JlstError>(())
/// ```
#[derive(Clone, Debug)]
pub struct LoadRequest<'a> {
    data: &'a [u8],
    format_type: Option<&'a str>,
    hints: ImageInfo,
    limits: Option<&'a Limits>,
}

impl<'a> LoadRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            format_type: None,
            hints: ImageInfo::default(),
            limits: None,
        }
    }

    /// Skip detection and use the handler serving `format_type`.
    pub fn with_type(mut self, format_type: &'a str) -> Self {
        self.format_type = Some(format_type);
        self
    }

    pub fn with_hints(mut self, hints: ImageInfo) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn load(self, registry: &Registry, stop: impl Stop) -> Result<Image, JlstError> {
        stop.check()?;
        let mut source = Source::new(self.data);
        let handler = match self.format_type {
            Some(format_type) => registry.require_type(format_type)?,
            None => registry.detect_format(&mut source, &self.hints)?,
        };
        debug!(format = handler.name(), bytes = self.data.len(), "loading");
        handler.load(&mut source, &self.hints, self.limits, &stop)
    }
}

/// Serialise an image with the handler serving a type name.
///
/// ```
/// use zenjlst::{FrameInfo, Image, ImageInfo, InterleaveMode, Registry, SaveRequest, Unstoppable};
/// use zenjlst::jls::NoCodec;
///
/// let info = ImageInfo::new(FrameInfo::new(2, 1, 8, 1), InterleaveMode::None);
/// let image = Image::from_pixels(info, vec![10, 20])?;
/// let bytes = SaveRequest::new("pgm").save(&Registry::builtin(NoCodec), &image, Unstoppable)?;
/// assert_eq!(bytes, b"P5\n2 1\n255\n\x0a\x14");
/// # Ok::<(), zenjlst::JlstError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SaveRequest<'a> {
    format_type: &'a str,
    options: EncodeOptions,
}

impl<'a> SaveRequest<'a> {
    pub fn new(format_type: &'a str) -> Self {
        Self {
            format_type,
            options: EncodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn save(
        self,
        registry: &Registry,
        image: &Image,
        stop: impl Stop,
    ) -> Result<Vec<u8>, JlstError> {
        stop.check()?;
        let handler = registry.require_type(self.format_type)?;
        handler.save(image, &self.options, &stop)
    }
}
