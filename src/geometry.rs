//! Crop, flip, rotate, transpose, transverse and wipe on packed pixel buffers.
//!
//! The free functions take a tightly packed, pixel-interleaved [`Image`] and
//! return a new buffer; pixels are moved as whole
//! `component_count * ceil(bits/8)` byte units so any bit depth is exact.
//! Calling them with a padded stride is a contract violation and panics.
//! [`TransformRequest::apply`] wraps them with frame bookkeeping and handles
//! planar input.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::JlstError;
use crate::image::{Image, ImageData};
use crate::pixel::{FrameInfo, InterleaveMode};

/// Rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Reject empty regions and regions reaching outside the frame.
    fn check(&self, frame: &FrameInfo) -> Result<(), JlstError> {
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        if self.width == 0
            || self.height == 0
            || right > u64::from(frame.width)
            || bottom > u64::from(frame.height)
        {
            return Err(JlstError::InvalidRegion {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                image_width: frame.width,
                image_height: frame.height,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flip {
    /// Mirror each scanline.
    Horizontal,
    /// Reverse scanline order.
    Vertical,
}

/// Clockwise rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u32) -> Result<Self, JlstError> {
        match degrees {
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(JlstError::UnsupportedGeometry(format!(
                "rotation by {other} degrees"
            ))),
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    fn swaps_axes(self) -> bool {
        !matches!(self, Self::Deg180)
    }
}

/// A lossless geometric edit, as applied by the bitstream transformer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformRequest {
    Crop(Region),
    Flip(Flip),
    Rotate(Rotation),
    Transpose,
    Transverse,
    Wipe(Region),
}

impl TransformRequest {
    /// Parse a `WxH+X+Y` (or `W,H,X,Y`) region argument.
    pub fn parse_region(text: &str) -> Result<Region, JlstError> {
        let mut values = [0u32; 4];
        let mut parts = text.trim().split(['x', 'X', '+', ',']);
        for value in &mut values {
            let part = parts
                .next()
                .ok_or_else(|| JlstError::MalformedHeader(format!("region {text:?}")))?;
            *value = part
                .trim()
                .parse()
                .map_err(|_| JlstError::MalformedHeader(format!("region {text:?}")))?;
        }
        if parts.next().is_some() {
            return Err(JlstError::MalformedHeader(format!("region {text:?}")));
        }
        let [width, height, x, y] = values;
        Ok(Region::new(x, y, width, height))
    }

    /// Frame of the image this request produces from `frame`.
    pub fn output_frame(&self, frame: &FrameInfo) -> FrameInfo {
        let mut out = *frame;
        match self {
            Self::Crop(region) => {
                out.width = region.width;
                out.height = region.height;
            }
            Self::Rotate(r) if !r.swaps_axes() => {}
            Self::Rotate(_) | Self::Transpose | Self::Transverse => {
                out.width = frame.height;
                out.height = frame.width;
            }
            Self::Flip(_) | Self::Wipe(_) => {}
        }
        out
    }

    /// Apply the request to a copy of `image`.
    ///
    /// Padded scanlines are repacked first. Planar 3-component images are
    /// interleaved for the edit and returned planar.
    pub fn apply(&self, image: &Image) -> Result<Image, JlstError> {
        let planar =
            image.info.frame.component_count > 1 && image.info.interleave_mode == InterleaveMode::None;
        let mut work = if planar {
            image.clone().into_interleave(InterleaveMode::Sample)?
        } else {
            image.clone()
        };
        work.normalize_stride()?;
        let needed = work.info.frame.buffer_len()?;
        if work.data.pixels.len() < needed {
            return Err(JlstError::BufferTooSmall {
                needed,
                actual: work.data.pixels.len(),
            });
        }

        let pixels = match *self {
            Self::Crop(region) => crop(&work, region)?,
            Self::Flip(direction) => flip(&work, direction),
            Self::Rotate(rotation) => rotate(&work, rotation),
            Self::Transpose => transpose(&work),
            Self::Transverse => transverse(&work),
            Self::Wipe(region) => wipe(&work, region)?,
        };
        let mut info = work.info;
        info.frame = self.output_frame(&info.frame);
        let out = Image {
            info,
            data: ImageData { stride: 0, pixels },
        };
        if planar {
            out.into_interleave(InterleaveMode::None)
        } else {
            Ok(out)
        }
    }
}

/// Frame dimensions and pixel size, after asserting the packing contract.
fn packed(image: &Image) -> (usize, usize, usize) {
    let frame = &image.info.frame;
    assert!(
        image.is_tightly_packed(),
        "geometric transforms need a tightly packed buffer (stride {}, row {})",
        image.data.stride,
        frame.tight_stride()
    );
    let (w, h, nbytes) = (frame.width as usize, frame.height as usize, frame.bytes_per_pixel());
    assert!(
        image.data.pixels.len() >= w * h * nbytes,
        "pixel buffer shorter than its {w}x{h} frame"
    );
    (w, h, nbytes)
}

/// Build an `out_w x out_h` buffer, fetching each output pixel from the input
/// pixel index `source(x, y)` returns.
fn remap(
    src: &[u8],
    nbytes: usize,
    out_w: usize,
    out_h: usize,
    source: impl Fn(usize, usize) -> usize,
) -> Vec<u8> {
    let mut out = vec![0u8; out_w * out_h * nbytes];
    for (i, dst) in out.chunks_exact_mut(nbytes).enumerate() {
        let s = source(i % out_w, i / out_w) * nbytes;
        dst.copy_from_slice(&src[s..s + nbytes]);
    }
    out
}

/// Copy `region` out of the image. Output is `region.width x region.height`.
pub fn crop(image: &Image, region: Region) -> Result<Vec<u8>, JlstError> {
    let (w, _, nbytes) = packed(image);
    region.check(&image.info.frame)?;
    let (x, y) = (region.x as usize, region.y as usize);
    let row = region.width as usize * nbytes;
    let mut out = vec![0u8; row * region.height as usize];
    for (line, dst) in out.chunks_exact_mut(row).enumerate() {
        let start = ((y + line) * w + x) * nbytes;
        dst.copy_from_slice(&image.data.pixels[start..start + row]);
    }
    Ok(out)
}

pub fn flip(image: &Image, direction: Flip) -> Vec<u8> {
    let (w, h, nbytes) = packed(image);
    let src = &image.data.pixels[..w * h * nbytes];
    if src.is_empty() {
        return Vec::new();
    }
    match direction {
        Flip::Vertical => src
            .chunks_exact(w * nbytes)
            .rev()
            .flatten()
            .copied()
            .collect(),
        Flip::Horizontal => remap(src, nbytes, w, h, |x, y| y * w + (w - 1 - x)),
    }
}

pub fn rotate(image: &Image, rotation: Rotation) -> Vec<u8> {
    let (w, h, nbytes) = packed(image);
    let src = &image.data.pixels;
    match rotation {
        Rotation::Deg90 => remap(src, nbytes, h, w, |x, y| (h - 1 - x) * w + y),
        Rotation::Deg180 => remap(src, nbytes, w, h, |x, y| (h - 1 - y) * w + (w - 1 - x)),
        Rotation::Deg270 => remap(src, nbytes, h, w, |x, y| x * w + (w - 1 - y)),
    }
}

/// Mirror across the main diagonal.
pub fn transpose(image: &Image) -> Vec<u8> {
    let (w, h, nbytes) = packed(image);
    remap(&image.data.pixels, nbytes, h, w, |x, y| x * w + y)
}

/// Mirror across the anti-diagonal.
pub fn transverse(image: &Image) -> Vec<u8> {
    let (w, h, nbytes) = packed(image);
    remap(&image.data.pixels, nbytes, h, w, |x, y| {
        (h - 1 - x) * w + (w - 1 - y)
    })
}

/// Zero the pixels inside `region`; everything else is copied.
pub fn wipe(image: &Image, region: Region) -> Result<Vec<u8>, JlstError> {
    let (w, h, nbytes) = packed(image);
    region.check(&image.info.frame)?;
    let mut out = image.data.pixels[..w * h * nbytes].to_vec();
    let (x, y) = (region.x as usize, region.y as usize);
    let span = region.width as usize * nbytes;
    for line in y..y + region.height as usize {
        let start = (line * w + x) * nbytes;
        out[start..start + span].fill(0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageInfo;

    fn gray(width: u32, height: u32, pixels: &[u8]) -> Image {
        let frame = FrameInfo::new(width, height, 8, 1);
        Image::from_pixels(ImageInfo::new(frame, InterleaveMode::None), pixels.to_vec()).unwrap()
    }

    #[test]
    fn rotate_90_moves_left_column_to_top_row() {
        // 1 2 3
        // 4 5 6
        let img = gray(3, 2, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(rotate(&img, Rotation::Deg90), [4, 1, 5, 2, 6, 3]);
        assert_eq!(rotate(&img, Rotation::Deg270), [3, 6, 2, 5, 1, 4]);
        assert_eq!(rotate(&img, Rotation::Deg180), [6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn transpose_and_transverse() {
        let img = gray(3, 2, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(transpose(&img), [1, 4, 2, 5, 3, 6]);
        assert_eq!(transverse(&img), [6, 3, 5, 2, 4, 1]);
    }

    #[test]
    fn flips() {
        let img = gray(3, 2, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(flip(&img, Flip::Vertical), [4, 5, 6, 1, 2, 3]);
        assert_eq!(flip(&img, Flip::Horizontal), [3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn region_syntax() {
        assert_eq!(
            TransformRequest::parse_region("16x8+2+3").unwrap(),
            Region::new(2, 3, 16, 8)
        );
        assert_eq!(
            TransformRequest::parse_region("16,8,2,3").unwrap(),
            Region::new(2, 3, 16, 8)
        );
        assert!(TransformRequest::parse_region("16x8+2").is_err());
        assert!(TransformRequest::parse_region("16x8+2+3+4").is_err());
        assert!(TransformRequest::parse_region("-1x8+2+3").is_err());
    }

    #[test]
    fn rotation_degrees() {
        assert_eq!(Rotation::from_degrees(270).unwrap(), Rotation::Deg270);
        assert!(matches!(
            Rotation::from_degrees(45),
            Err(JlstError::UnsupportedGeometry(_))
        ));
    }

    #[test]
    #[should_panic(expected = "tightly packed")]
    fn padded_stride_panics() {
        let mut img = gray(2, 2, &[1, 2, 3, 4]);
        img.data.stride = 4;
        img.data.pixels = vec![1, 2, 0, 0, 3, 4, 0, 0];
        let _ = transpose(&img);
    }
}
