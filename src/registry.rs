//! Format handlers and priority-ordered dispatch.

use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;
use tracing::{debug, trace};

use crate::error::JlstError;
use crate::image::{Image, ImageInfo};
use crate::jls::{EncodeOptions, JlsFormat, JpeglsCodec};
use crate::limits::Limits;
use crate::pnm::PnmFormat;
use crate::raw::RawFormat;
use crate::source::Source;

/// Which container a handler reads and writes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Pnm,
    Raw,
    Jls,
}

/// Capability set every container format provides.
///
/// Readers run in two passes over one [`Source`]: `read_info` fills the
/// geometry, [`FormatHandler::load`] sizes the pixel buffer, then `read_data`
/// fills it. Writers append to a byte sink.
pub trait FormatHandler: Send + Sync {
    fn kind(&self) -> FormatKind;

    fn name(&self) -> &'static str;

    /// Whether this handler serves an explicit type name such as `"pgm"`.
    fn handle_type(&self, format_type: &str) -> bool;

    /// Content sniffing. May move the cursor; callers rewind before probing.
    fn detect(&self, source: &mut Source<'_>, hints: &ImageInfo) -> bool;

    fn read_info(&self, source: &mut Source<'_>, image: &mut Image) -> Result<(), JlstError>;

    fn read_data(
        &self,
        source: &mut Source<'_>,
        image: &mut Image,
        stop: &dyn Stop,
    ) -> Result<(), JlstError>;

    fn write_info(
        &self,
        dest: &mut Vec<u8>,
        image: &Image,
        options: &EncodeOptions,
    ) -> Result<(), JlstError>;

    fn write_data(
        &self,
        dest: &mut Vec<u8>,
        image: &Image,
        options: &EncodeOptions,
        stop: &dyn Stop,
    ) -> Result<(), JlstError>;

    /// Read a complete image, starting from `hints`.
    fn load(
        &self,
        source: &mut Source<'_>,
        hints: &ImageInfo,
        limits: Option<&Limits>,
        stop: &dyn Stop,
    ) -> Result<Image, JlstError> {
        let mut image = Image::from_hints(hints);
        source.rewind();
        self.read_info(source, &mut image)?;
        if let Some(limits) = limits {
            limits.check(&image.info.frame)?;
        }
        stop.check()?;
        image.data.pixels = vec![0; image.info.frame.buffer_len()?];
        self.read_data(source, &mut image, stop)?;
        debug!(
            format = self.name(),
            width = image.info.frame.width,
            height = image.info.frame.height,
            bits = image.info.frame.bits_per_sample,
            components = image.info.frame.component_count,
            "loaded image"
        );
        Ok(image)
    }

    /// Serialise `image`, header then body.
    fn save(
        &self,
        image: &Image,
        options: &EncodeOptions,
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, JlstError> {
        let mut dest = Vec::new();
        self.write_info(&mut dest, image, options)?;
        self.write_data(&mut dest, image, options, stop)?;
        debug!(format = self.name(), bytes = dest.len(), "saved image");
        Ok(dest)
    }
}

struct Entry {
    handler: Box<dyn FormatHandler>,
    priority: f32,
}

impl core::fmt::Debug for dyn FormatHandler + '_ {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FormatHandler").field(&self.name()).finish()
    }
}

/// Handlers ordered by descending priority; equal priorities keep
/// registration order.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.handler.name(), e.priority)))
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// JPEG-LS (1.0), PNM (0.5) and RAW (0.0). RAW claims any input whose
    /// size matches the hints, so it is tried last.
    pub fn builtin<C: JpeglsCodec + 'static>(codec: C) -> Self {
        let mut registry = Self::new();
        registry.insert(Box::new(JlsFormat::new(codec)), 1.0);
        registry.insert(Box::new(PnmFormat::default()), 0.5);
        registry.insert(Box::new(RawFormat::default()), 0.0);
        registry
    }

    /// Add a handler. `priority` must lie in `[0, 1]`.
    pub fn register(
        &mut self,
        handler: Box<dyn FormatHandler>,
        priority: f32,
    ) -> Result<(), JlstError> {
        if !(0.0..=1.0).contains(&priority) {
            return Err(JlstError::InvalidPriority(priority));
        }
        self.insert(handler, priority);
        Ok(())
    }

    fn insert(&mut self, handler: Box<dyn FormatHandler>, priority: f32) {
        let at = self
            .entries
            .iter()
            .position(|e| e.priority < priority)
            .unwrap_or(self.entries.len());
        trace!(format = handler.name(), priority, index = at, "registered format");
        self.entries.insert(at, Entry { handler, priority });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handler names in detection order.
    pub fn format_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.handler.name())
    }

    pub fn get_format_from_type(&self, format_type: &str) -> Option<&dyn FormatHandler> {
        self.entries
            .iter()
            .map(|e| e.handler.as_ref())
            .find(|h| h.handle_type(format_type))
    }

    /// Like [`Registry::get_format_from_type`], as an error when nothing matches.
    pub fn require_type(&self, format_type: &str) -> Result<&dyn FormatHandler, JlstError> {
        self.get_format_from_type(format_type)
            .ok_or_else(|| JlstError::UnknownFormatType(format_type.to_string()))
    }

    /// First handler, in priority order, that claims `source`.
    ///
    /// The cursor is rewound before each handler runs and after a match.
    pub fn detect_format(
        &self,
        source: &mut Source<'_>,
        hints: &ImageInfo,
    ) -> Result<&dyn FormatHandler, JlstError> {
        for entry in &self.entries {
            source.rewind();
            let claimed = entry.handler.detect(source, hints);
            trace!(format = entry.handler.name(), claimed, "tried format");
            if claimed {
                source.rewind();
                debug!(format = entry.handler.name(), "detected format");
                return Ok(entry.handler.as_ref());
            }
        }
        source.rewind();
        debug!(
            size = source.size(),
            formats = ?self.format_names().collect::<Vec<_>>(),
            "no format claimed input"
        );
        Err(JlstError::FormatDetectionFailed)
    }
}
