use crate::error::JlstError;

/// Frame geometry, independent of how the samples are encoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    /// 1..=16. Samples wider than 8 bits occupy two bytes.
    pub bits_per_sample: u8,
    /// 1, 3 or 4.
    pub component_count: u8,
}

impl FrameInfo {
    pub const fn new(width: u32, height: u32, bits_per_sample: u8, component_count: u8) -> Self {
        Self {
            width,
            height,
            bits_per_sample,
            component_count,
        }
    }

    /// Bytes used to store one sample (1 or 2).
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample).div_ceil(8)
    }

    /// Bytes used by one pixel with all its components.
    pub fn bytes_per_pixel(&self) -> usize {
        usize::from(self.component_count) * self.bytes_per_sample()
    }

    /// Scanline length of a tightly packed, pixel-interleaved buffer.
    pub fn tight_stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// Exact byte size of a tightly packed buffer for this frame.
    pub fn buffer_len(&self) -> Result<usize, JlstError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|wh| wh.checked_mul(self.bytes_per_pixel()))
            .ok_or(JlstError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            })
    }

    /// Largest sample value representable at this bit depth.
    pub fn max_sample_value(&self) -> u32 {
        1u32.checked_shl(u32::from(self.bits_per_sample))
            .map_or(u32::MAX, |v| v - 1)
    }
}

/// Order in which the components of a multi-component image are stored.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterleaveMode {
    /// Planar: all samples of component 0, then component 1, ...
    #[default]
    None,
    /// Components alternate per scanline.
    Line,
    /// Components alternate per pixel (RGBRGB...).
    Sample,
}

impl InterleaveMode {
    /// Decode the ILV field of a JPEG-LS scan header.
    pub fn from_ilv(ilv: u8) -> Option<Self> {
        match ilv {
            0 => Some(Self::None),
            1 => Some(Self::Line),
            2 => Some(Self::Sample),
            _ => None,
        }
    }

    pub fn ilv(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Line => 1,
            Self::Sample => 2,
        }
    }
}

/// Typed pixels that an interleaved [`crate::Image`] can be viewed as.
#[cfg(feature = "rgb")]
pub trait ImagePixel: Copy {
    /// Components per pixel.
    const COMPONENTS: u8;
    /// Whether samples are two bytes wide (bit depth 9..=16).
    const WIDE: bool;
    /// Build a pixel from its little-endian sample bytes.
    fn from_samples(bytes: &[u8]) -> Self;
}

#[cfg(feature = "rgb")]
impl ImagePixel for u8 {
    const COMPONENTS: u8 = 1;
    const WIDE: bool = false;
    fn from_samples(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

#[cfg(feature = "rgb")]
impl ImagePixel for u16 {
    const COMPONENTS: u8 = 1;
    const WIDE: bool = true;
    fn from_samples(bytes: &[u8]) -> Self {
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

#[cfg(feature = "rgb")]
impl ImagePixel for rgb::RGB8 {
    const COMPONENTS: u8 = 3;
    const WIDE: bool = false;
    fn from_samples(bytes: &[u8]) -> Self {
        rgb::RGB8::new(bytes[0], bytes[1], bytes[2])
    }
}

#[cfg(feature = "rgb")]
impl ImagePixel for rgb::RGB16 {
    const COMPONENTS: u8 = 3;
    const WIDE: bool = true;
    fn from_samples(bytes: &[u8]) -> Self {
        rgb::RGB16::new(
            u16::from_le_bytes([bytes[0], bytes[1]]),
            u16::from_le_bytes([bytes[2], bytes[3]]),
            u16::from_le_bytes([bytes[4], bytes[5]]),
        )
    }
}
