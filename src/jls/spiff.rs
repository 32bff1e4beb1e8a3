//! SPIFF (still picture interchange file format) header carried in APP8.

use alloc::format;
use alloc::vec::Vec;
use core::fmt;

use crate::error::JlstError;
use crate::pixel::FrameInfo;

/// APP8 marker + 32-byte segment holding the SPIFF header.
pub const SPIFF_SEGMENT_LEN: usize = 34;
/// APP8 end-of-directory entry, including the restarted SOI.
pub const SPIFF_END_OF_DIRECTORY_LEN: usize = 10;
/// Header segment plus end-of-directory, as written after SOI.
pub const STANDARD_SPIFF_LEN: usize = SPIFF_SEGMENT_LEN + SPIFF_END_OF_DIRECTORY_LEN;

pub(crate) const SPIFF_MAGIC: &[u8; 6] = b"SPIFF\0";
const SPIFF_VERSION: [u8; 2] = [2, 0];
const END_OF_DIRECTORY: u32 = 1;

macro_rules! spiff_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal { $($variant:ident = $value:literal => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant = $value),+
        }

        impl TryFrom<u8> for $name {
            type Error = JlstError;

            fn try_from(v: u8) -> Result<Self, Self::Error> {
                match v {
                    $($value => Ok(Self::$variant),)+
                    other => Err(JlstError::MalformedHeader(format!(
                        concat!("unknown SPIFF ", $what, " {}"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $text),+
                })
            }
        }
    };
}

spiff_enum! {
    /// Application profile (P).
    SpiffProfileId, "profile" {
        None = 0 => "none",
        ContinuousToneBase = 1 => "continuous_tone_base",
        ContinuousToneProgressive = 2 => "continuous_tone_progressive",
        BiLevelFacsimile = 3 => "bi_level_facsimile",
        ContinuousToneFacsimile = 4 => "continuous_tone_facsimile",
    }
}

spiff_enum! {
    /// Colour space of the image data (S).
    SpiffColorSpace, "color space" {
        BiLevelBlack = 0 => "bi_level_black",
        YCbCrItuBt709Video = 1 => "ycbcr_itu_bt_709_video",
        None = 2 => "none",
        YCbCrItuBt6011Rgb = 3 => "ycbcr_itu_bt_601_1_rgb",
        YCbCrItuBt6011Video = 4 => "ycbcr_itu_bt_601_1_video",
        Grayscale = 8 => "grayscale",
        PhotoYcc = 9 => "photo_ycc",
        Rgb = 10 => "rgb",
        Cmy = 11 => "cmy",
        Cmyk = 12 => "cmyk",
        Ycck = 13 => "ycck",
        CieLab = 14 => "cie_lab",
        BiLevelWhite = 15 => "bi_level_white",
    }
}

spiff_enum! {
    /// Compression applied to the image data (C).
    SpiffCompressionType, "compression type" {
        Uncompressed = 0 => "uncompressed",
        ModifiedHuffman = 1 => "modified_huffman",
        ModifiedRead = 2 => "modified_read",
        ModifiedModifiedRead = 3 => "modified_modified_read",
        Jbig = 4 => "jbig",
        Jpeg = 5 => "jpeg",
        JpegLs = 6 => "jpeg_ls",
    }
}

spiff_enum! {
    /// Units of the resolution fields (R).
    SpiffResolutionUnits, "resolution units" {
        AspectRatio = 0 => "aspect_ratio",
        DotsPerInch = 1 => "dots_per_inch",
        DotsPerCentimeter = 2 => "dots_per_centimeter",
    }
}

impl SpiffColorSpace {
    /// Components implied by the colour space; `None` for "none".
    pub fn component_count(self) -> Option<u8> {
        match self {
            Self::None => None,
            Self::BiLevelBlack
            | Self::BiLevelWhite
            | Self::Grayscale
            | Self::YCbCrItuBt6011Rgb
            | Self::YCbCrItuBt6011Video => Some(1),
            Self::YCbCrItuBt709Video | Self::PhotoYcc | Self::Rgb | Self::Cmy | Self::CieLab => {
                Some(3)
            }
            Self::Cmyk | Self::Ycck => Some(4),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiffHeader {
    pub profile_id: SpiffProfileId,
    pub component_count: u8,
    pub height: u32,
    pub width: u32,
    pub color_space: SpiffColorSpace,
    pub bits_per_sample: u8,
    pub compression_type: SpiffCompressionType,
    pub resolution_units: SpiffResolutionUnits,
    pub vertical_resolution: u32,
    pub horizontal_resolution: u32,
}

impl SpiffHeader {
    /// The header a JPEG-LS encoder writes by default: grayscale or RGB,
    /// no profile, 1:1 aspect ratio.
    pub fn standard(frame: &FrameInfo) -> Self {
        Self {
            profile_id: SpiffProfileId::None,
            component_count: frame.component_count,
            height: frame.height,
            width: frame.width,
            color_space: if frame.component_count == 1 {
                SpiffColorSpace::Grayscale
            } else {
                SpiffColorSpace::Rgb
            },
            bits_per_sample: frame.bits_per_sample,
            compression_type: SpiffCompressionType::JpegLs,
            resolution_units: SpiffResolutionUnits::AspectRatio,
            vertical_resolution: 1,
            horizontal_resolution: 1,
        }
    }

    /// The 44-byte standard header for `frame`.
    pub fn write_standard(frame: &FrameInfo) -> Vec<u8> {
        let mut out = Vec::with_capacity(STANDARD_SPIFF_LEN);
        Self::standard(frame).write(&mut out);
        out
    }

    /// Append the APP8 header segment and the end-of-directory entry.
    pub fn write(&self, dest: &mut Vec<u8>) {
        dest.extend_from_slice(&[0xFF, 0xE8]);
        dest.extend_from_slice(&((SPIFF_SEGMENT_LEN - 2) as u16).to_be_bytes());
        dest.extend_from_slice(SPIFF_MAGIC);
        dest.extend_from_slice(&SPIFF_VERSION);
        dest.push(self.profile_id as u8);
        dest.push(self.component_count);
        dest.extend_from_slice(&self.height.to_be_bytes());
        dest.extend_from_slice(&self.width.to_be_bytes());
        dest.push(self.color_space as u8);
        dest.push(self.bits_per_sample);
        dest.push(self.compression_type as u8);
        dest.push(self.resolution_units as u8);
        dest.extend_from_slice(&self.vertical_resolution.to_be_bytes());
        dest.extend_from_slice(&self.horizontal_resolution.to_be_bytes());

        dest.extend_from_slice(&[0xFF, 0xE8, 0x00, 0x08]);
        dest.extend_from_slice(&END_OF_DIRECTORY.to_be_bytes());
        dest.extend_from_slice(&[0xFF, 0xD8]);
    }

    /// Parse an APP8 payload (after the length field) that starts with the
    /// SPIFF magic.
    pub(crate) fn parse(payload: &[u8]) -> Result<Self, JlstError> {
        if payload.len() < SPIFF_SEGMENT_LEN - 4 {
            return Err(JlstError::MalformedHeader(format!(
                "SPIFF header of {} bytes",
                payload.len()
            )));
        }
        let p = &payload[SPIFF_MAGIC.len()..];
        if p[0] != SPIFF_VERSION[0] {
            return Err(JlstError::MalformedHeader(format!(
                "SPIFF version {}.{}",
                p[0], p[1]
            )));
        }
        let u32_at = |i: usize| u32::from_be_bytes([p[i], p[i + 1], p[i + 2], p[i + 3]]);
        Ok(Self {
            profile_id: SpiffProfileId::try_from(p[2])?,
            component_count: p[3],
            height: u32_at(4),
            width: u32_at(8),
            color_space: SpiffColorSpace::try_from(p[12])?,
            bits_per_sample: p[13],
            compression_type: SpiffCompressionType::try_from(p[14])?,
            resolution_units: SpiffResolutionUnits::try_from(p[15])?,
            vertical_resolution: u32_at(16),
            horizontal_resolution: u32_at(20),
        })
    }

    /// Whether width, height, depth and component count agree with `frame`.
    pub fn matches_frame(&self, frame: &FrameInfo) -> bool {
        self.width == frame.width
            && self.height == frame.height
            && self.bits_per_sample == frame.bits_per_sample
            && self.component_count == frame.component_count
    }
}
