//! In-memory image shared by every format handler.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use enough::Stop;

use crate::error::JlstError;
use crate::layout;
use crate::pixel::{FrameInfo, InterleaveMode};

/// Scanlines between cancellation checks.
const ROWS_PER_CHECK: usize = 16;

/// Geometry, sample ordering and comment of an image.
///
/// Two infos compare equal when frame geometry and interleave mode match;
/// the comment does not take part.
#[derive(Clone, Debug, Default)]
pub struct ImageInfo {
    pub frame: FrameInfo,
    pub interleave_mode: InterleaveMode,
    pub comment: String,
}

impl PartialEq for ImageInfo {
    fn eq(&self, other: &Self) -> bool {
        self.frame == other.frame && self.interleave_mode == other.interleave_mode
    }
}

impl Eq for ImageInfo {}

impl ImageInfo {
    pub fn new(frame: FrameInfo, interleave_mode: InterleaveMode) -> Self {
        Self {
            frame,
            interleave_mode,
            comment: String::new(),
        }
    }

    /// Geometry hints for headerless inputs. Zero fields are "unset".
    pub fn hints(width: u32, height: u32) -> Self {
        Self::new(FrameInfo::new(width, height, 0, 0), InterleaveMode::None)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sentinel state of an image no reader has filled in yet.
    pub fn is_invalid(&self) -> bool {
        self.frame.width == 0
    }
}

/// Pixel bytes plus the scanline stride they were laid out with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageData {
    /// Bytes between scanlines; 0 means tightly packed.
    pub stride: usize,
    pub pixels: Vec<u8>,
}

/// A decoded image: info plus pixel data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    pub info: ImageInfo,
    pub data: ImageData,
}

impl Image {
    /// An empty image in the invalid sentinel state, seeded with hints.
    pub fn from_hints(hints: &ImageInfo) -> Self {
        Self {
            info: hints.clone(),
            data: ImageData::default(),
        }
    }

    /// Build a tightly packed image from existing pixels.
    pub fn from_pixels(info: ImageInfo, pixels: Vec<u8>) -> Result<Self, JlstError> {
        let needed = info.frame.buffer_len()?;
        if pixels.len() != needed {
            return Err(JlstError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            info,
            data: ImageData { stride: 0, pixels },
        })
    }

    pub fn frame(&self) -> &FrameInfo {
        &self.info.frame
    }

    pub fn pixels(&self) -> &[u8] {
        &self.data.pixels
    }

    /// Scanline stride with the "0 = tight" convention resolved.
    pub fn effective_stride(&self) -> usize {
        match self.data.stride {
            0 => self.info.frame.tight_stride(),
            s => s,
        }
    }

    /// Whether scanlines follow each other without padding.
    pub fn is_tightly_packed(&self) -> bool {
        self.data.stride == 0 || self.data.stride == self.info.frame.tight_stride()
    }

    /// Drop per-line padding so that `stride == 0`.
    ///
    /// A stride shorter than one scanline is an error.
    pub fn normalize_stride(&mut self) -> Result<(), JlstError> {
        if self.data.stride == 0 {
            return Ok(());
        }
        let stride = self.data.stride;
        let tight = self.info.frame.tight_stride();
        if stride < tight {
            return Err(JlstError::UnsupportedGeometry(format!(
                "stride {stride} shorter than a {tight}-byte scanline"
            )));
        }
        if stride != tight {
            let rows = self.info.frame.height as usize;
            let mut packed = Vec::with_capacity(rows * tight);
            for row in self.data.pixels.chunks(stride).take(rows) {
                packed.extend_from_slice(&row[..tight.min(row.len())]);
            }
            self.data.pixels = packed;
        }
        self.data.stride = 0;
        Ok(())
    }

    /// Fold `other` into this image.
    ///
    /// An invalid image becomes a copy of `other`; otherwise the infos must
    /// match and `other`'s pixel bytes are concatenated after ours.
    pub fn append(&mut self, other: &Image) -> Result<(), JlstError> {
        if self.info.is_invalid() {
            *self = other.clone();
            return Ok(());
        }
        if self.info != other.info {
            return Err(JlstError::UnsupportedGeometry(format!(
                "cannot append {:?} to {:?}",
                other.info.frame, self.info.frame
            )));
        }
        self.data.pixels.extend_from_slice(&other.data.pixels);
        Ok(())
    }

    /// Merge loaded inputs into the image to encode.
    ///
    /// One image passes through; three single-component images become the
    /// planes of one 3-component planar image.
    pub fn combine(images: Vec<Image>) -> Result<Image, JlstError> {
        match images.len() {
            1 => Ok(images.into_iter().next().unwrap_or_default()),
            3 => {
                let mut combined = Image::default();
                for image in &images {
                    if image.info.frame.component_count != 1 {
                        return Err(JlstError::UnsupportedGeometry(format!(
                            "plane with {} components",
                            image.info.frame.component_count
                        )));
                    }
                    combined.append(image)?;
                }
                combined.info.frame.component_count = 3;
                combined.info.interleave_mode = InterleaveMode::None;
                combined.data.stride = 0;
                Ok(combined)
            }
            n => Err(JlstError::UnsupportedGeometry(format!(
                "cannot combine {n} images, expected 1 or 3"
            ))),
        }
    }

    /// Pixel bytes expressed in `target` interleave mode.
    ///
    /// Line and sample interleaving share the triplet layout in memory, so
    /// converting between them borrows.
    pub fn pixels_in(&self, target: InterleaveMode) -> Result<Cow<'_, [u8]>, JlstError> {
        let frame = &self.info.frame;
        let current = self.info.interleave_mode;
        if frame.component_count == 1 || current == target {
            return Ok(Cow::Borrowed(&self.data.pixels));
        }
        if frame.component_count == 3 {
            let (w, h, bits) = (frame.width, frame.height, frame.bits_per_sample);
            match (current, target) {
                (InterleaveMode::None, InterleaveMode::Sample | InterleaveMode::Line) => {
                    let stride = self.effective_stride();
                    return layout::planar_to_triplet(&self.data.pixels, w, h, bits, stride)
                        .map(Cow::Owned);
                }
                (InterleaveMode::Sample | InterleaveMode::Line, InterleaveMode::None) => {
                    let stride = self.effective_stride();
                    return layout::triplet_to_planar(&self.data.pixels, w, h, bits, stride)
                        .map(Cow::Owned);
                }
                (InterleaveMode::Sample, InterleaveMode::Line)
                | (InterleaveMode::Line, InterleaveMode::Sample) => {
                    return Ok(Cow::Borrowed(&self.data.pixels));
                }
                _ => {}
            }
        }
        Err(JlstError::UnsupportedGeometry(format!(
            "unsupported transform request: {} components, {current:?} -> {target:?}",
            frame.component_count
        )))
    }

    /// Owning variant of [`Image::pixels_in`] that also updates the info.
    pub fn into_interleave(self, target: InterleaveMode) -> Result<Image, JlstError> {
        if self.info.interleave_mode == target || self.info.frame.component_count == 1 {
            return Ok(self);
        }
        let pixels = self.pixels_in(target)?.into_owned();
        let stride = match target {
            InterleaveMode::None => 0,
            _ => self.data.stride,
        };
        let mut info = self.info;
        info.interleave_mode = target;
        Ok(Image {
            info,
            data: ImageData { stride, pixels },
        })
    }

    /// Fill the pre-sized pixel buffer from big-endian on-disk samples.
    pub(crate) fn read_big_endian(&mut self, body: &[u8], stop: &dyn Stop) -> Result<(), JlstError> {
        let len = self.data.pixels.len();
        let body = body.get(..len).ok_or(JlstError::UnexpectedEof)?;
        let wide = self.info.frame.bits_per_sample > 8;
        let chunk = self.info.frame.tight_stride().max(1) * ROWS_PER_CHECK;
        for (dst, src) in self.data.pixels.chunks_mut(chunk).zip(body.chunks(chunk)) {
            stop.check()?;
            if wide {
                for (d, s) in dst.chunks_exact_mut(2).zip(src.chunks_exact(2)) {
                    d[0] = s[1];
                    d[1] = s[0];
                }
            } else {
                dst.copy_from_slice(src);
            }
        }
        Ok(())
    }

    /// Append the pixels to `dest` in `target` layout, tightly packed, with
    /// 2-byte samples in big-endian order.
    pub(crate) fn write_big_endian(
        &self,
        target: InterleaveMode,
        dest: &mut Vec<u8>,
        stop: &dyn Stop,
    ) -> Result<(), JlstError> {
        let frame = &self.info.frame;
        let pixels = self.pixels_in(target)?;
        let planar = frame.component_count > 1 && target == InterleaveMode::None;
        let (lines, row, stride) = if planar {
            let row = frame.width as usize * frame.bytes_per_sample();
            let lines = frame.height as usize * usize::from(frame.component_count);
            (lines, row, row)
        } else {
            let stride = match (self.info.interleave_mode, &pixels) {
                (InterleaveMode::None, Cow::Owned(_)) => frame.tight_stride(),
                _ => self.effective_stride(),
            };
            (frame.height as usize, frame.tight_stride(), stride)
        };
        if lines == 0 || row == 0 {
            return Ok(());
        }
        let needed = (lines - 1) * stride + row;
        if pixels.len() < needed {
            return Err(JlstError::BufferTooSmall {
                needed,
                actual: pixels.len(),
            });
        }
        dest.reserve(lines * row);
        let wide = frame.bits_per_sample > 8;
        for line in 0..lines {
            if line % ROWS_PER_CHECK == 0 {
                stop.check()?;
            }
            let src = &pixels[line * stride..][..row];
            if wide {
                for sample in src.chunks_exact(2) {
                    dest.extend_from_slice(&[sample[1], sample[0]]);
                }
            } else {
                dest.extend_from_slice(src);
            }
        }
        Ok(())
    }

    /// Reinterpret interleaved pixel data as typed pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: crate::pixel::ImagePixel>(&self) -> Result<imgref::ImgVec<P>, JlstError> {
        let frame = &self.info.frame;
        let wide = frame.bits_per_sample > 8;
        let interleaved = frame.component_count == 1 || self.info.interleave_mode != InterleaveMode::None;
        if frame.component_count != P::COMPONENTS || wide != P::WIDE || !interleaved {
            return Err(JlstError::UnsupportedGeometry(format!(
                "{} components at {} bits ({:?}) do not match the requested pixel type",
                frame.component_count, frame.bits_per_sample, self.info.interleave_mode
            )));
        }
        let bpp = frame.bytes_per_pixel();
        let stride = self.effective_stride();
        let width = frame.width as usize;
        let height = frame.height as usize;
        let mut out = Vec::with_capacity(width * height);
        for row in 0..height {
            let line = self
                .data
                .pixels
                .get(row * stride..row * stride + width * bpp)
                .ok_or(JlstError::UnexpectedEof)?;
            out.extend(line.chunks_exact(bpp).map(P::from_samples));
        }
        Ok(imgref::ImgVec::new(out, width, height))
    }
}
