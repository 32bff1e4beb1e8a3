//! Planar <-> pixel-interleaved ("triplet") sample reordering.
//!
//! Only 3-component images pass through here; single-component buffers have
//! one layout and callers return them untouched. Samples of 9..=16 bits are
//! moved as whole 2-byte little-endian units.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::error::JlstError;

const COMPONENTS: usize = 3;

/// Bytes per sample for a bit depth the layout engine accepts.
pub(crate) fn sample_width(bits_per_sample: u8) -> Result<usize, JlstError> {
    match bits_per_sample {
        1..=8 => Ok(1),
        9..=16 => Ok(2),
        other => Err(JlstError::UnsupportedGeometry(format!(
            "{other} bits per sample"
        ))),
    }
}

struct Geometry {
    width: usize,
    height: usize,
    /// Bytes between triplet scanlines.
    stride: usize,
    /// Bytes of pixel data in one triplet scanline.
    row_bytes: usize,
    plane_bytes: usize,
}

impl Geometry {
    fn new(width: u32, height: u32, sample: usize, stride: usize) -> Result<Self, JlstError> {
        let too_large = JlstError::DimensionsTooLarge { width, height };
        let w = width as usize;
        let h = height as usize;
        let row_bytes = w
            .checked_mul(COMPONENTS * sample)
            .ok_or(too_large)?;
        let plane_bytes = w
            .checked_mul(h)
            .and_then(|wh| wh.checked_mul(sample))
            .ok_or(JlstError::DimensionsTooLarge { width, height })?;
        let stride = if stride == 0 { row_bytes } else { stride };
        if stride < row_bytes {
            return Err(JlstError::UnsupportedGeometry(format!(
                "stride {stride} shorter than a {row_bytes}-byte scanline"
            )));
        }
        h.checked_mul(stride)
            .ok_or(JlstError::DimensionsTooLarge { width, height })?;
        Ok(Self {
            width: w,
            height: h,
            stride,
            row_bytes,
            plane_bytes,
        })
    }

    /// Bytes a triplet buffer must hold; the last row may omit its padding.
    fn triplet_len(&self) -> usize {
        match self.height {
            0 => 0,
            h => (h - 1) * self.stride + self.row_bytes,
        }
    }
}

fn ensure_len(actual: usize, needed: usize) -> Result<(), JlstError> {
    if actual < needed {
        return Err(JlstError::BufferTooSmall { needed, actual });
    }
    Ok(())
}

/// Split RGBRGB... scanlines into three contiguous planes.
///
/// `stride` is the byte distance between triplet scanlines, 0 meaning
/// tightly packed. The planar result never carries padding.
pub fn triplet_to_planar(
    buffer: &[u8],
    width: u32,
    height: u32,
    bits_per_sample: u8,
    stride: usize,
) -> Result<Vec<u8>, JlstError> {
    let sample = sample_width(bits_per_sample)?;
    let geometry = Geometry::new(width, height, sample, stride)?;
    ensure_len(buffer.len(), geometry.triplet_len())?;
    Ok(match sample {
        1 => triplet_to_planar_impl::<1>(buffer, &geometry),
        _ => triplet_to_planar_impl::<2>(buffer, &geometry),
    })
}

/// Interleave three contiguous planes into RGBRGB... scanlines.
///
/// The result has `height * stride` bytes; padding bytes are zero.
pub fn planar_to_triplet(
    buffer: &[u8],
    width: u32,
    height: u32,
    bits_per_sample: u8,
    stride: usize,
) -> Result<Vec<u8>, JlstError> {
    let sample = sample_width(bits_per_sample)?;
    let geometry = Geometry::new(width, height, sample, stride)?;
    ensure_len(buffer.len(), COMPONENTS * geometry.plane_bytes)?;
    Ok(match sample {
        1 => planar_to_triplet_impl::<1>(buffer, &geometry),
        _ => planar_to_triplet_impl::<2>(buffer, &geometry),
    })
}

fn triplet_to_planar_impl<const N: usize>(src: &[u8], g: &Geometry) -> Vec<u8> {
    let mut out = vec![0u8; COMPONENTS * g.plane_bytes];
    for line in 0..g.height {
        let row = &src[line * g.stride..][..g.row_bytes];
        for (column, pixel) in row.chunks_exact(COMPONENTS * N).enumerate() {
            let dst = (line * g.width + column) * N;
            for c in 0..COMPONENTS {
                out[c * g.plane_bytes + dst..][..N].copy_from_slice(&pixel[c * N..][..N]);
            }
        }
    }
    out
}

fn planar_to_triplet_impl<const N: usize>(src: &[u8], g: &Geometry) -> Vec<u8> {
    let mut out = vec![0u8; g.height * g.stride];
    for line in 0..g.height {
        let row = &mut out[line * g.stride..][..g.row_bytes];
        for (column, pixel) in row.chunks_exact_mut(COMPONENTS * N).enumerate() {
            let src_off = (line * g.width + column) * N;
            for c in 0..COMPONENTS {
                pixel[c * N..][..N].copy_from_slice(&src[c * g.plane_bytes + src_off..][..N]);
            }
        }
    }
    out
}
