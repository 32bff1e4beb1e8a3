//! JPEG-LS marker segments up to the first start-of-scan.
//!
//! Layout read and written here (all lengths big-endian, including
//! themselves):
//!
//! ```text
//! FFD8                      SOI
//! [FFE8 SPIFF ... FFE8 EOD] SPIFF header + directory, restarts with SOI
//! [FFFE len text]           COM
//! [FFE8 len "mrfx" t]       colour transformation
//! [FFF8 len 01 ...]         LSE preset coding parameters
//! FFF7 len P Y X Nf ...     SOF55 frame header
//! FFDA len Ns ... NEAR ILV  SOS
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use tracing::trace;

use super::spiff::{SPIFF_MAGIC, SpiffHeader};
use crate::error::JlstError;
use crate::pixel::{FrameInfo, InterleaveMode};

pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const APP8: u8 = 0xE8;
pub const SOF55: u8 = 0xF7;
pub const LSE: u8 = 0xF8;
pub const COM: u8 = 0xFE;

const MRFX: &[u8; 4] = b"mrfx";
const LSE_PRESET_PARAMETERS: u8 = 1;
const LSE_OVERSIZE_DIMENSION: u8 = 4;

/// Thresholds of the JPEG-LS context model, as carried in an LSE segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PresetCodingParameters {
    pub maximum_sample_value: u16,
    pub threshold1: u16,
    pub threshold2: u16,
    pub threshold3: u16,
    pub reset_value: u16,
}

impl PresetCodingParameters {
    /// Parameters some encoders require for 13..=16 bit data.
    pub fn jai(bits_per_sample: u8) -> Option<Self> {
        let (t1, t2, t3) = match bits_per_sample {
            13 => (34, 131, 548),
            14 => (66, 259, 1092),
            15 => (130, 515, 2180),
            16 => (258, 1027, 4356),
            _ => return None,
        };
        Some(Self {
            maximum_sample_value: ((1u32 << bits_per_sample) - 1) as u16,
            threshold1: t1,
            threshold2: t2,
            threshold3: t3,
            reset_value: 64,
        })
    }

    /// The complete 15-byte LSE segment, marker included.
    pub fn to_segment(&self) -> [u8; 15] {
        let mut out = [0u8; 15];
        out[..5].copy_from_slice(&[0xFF, LSE, 0x00, 0x0D, LSE_PRESET_PARAMETERS]);
        let fields = [
            self.maximum_sample_value,
            self.threshold1,
            self.threshold2,
            self.threshold3,
            self.reset_value,
        ];
        for (dst, v) in out[5..].chunks_exact_mut(2).zip(fields) {
            dst.copy_from_slice(&v.to_be_bytes());
        }
        out
    }
}

/// Inverse colour transform signalled in the `mrfx` APP8 segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorTransformation {
    #[default]
    None,
    Hp1,
    Hp2,
    Hp3,
}

impl ColorTransformation {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::None),
            1 => Some(Self::Hp1),
            2 => Some(Self::Hp2),
            3 => Some(Self::Hp3),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ColorTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Hp1 => "hp1",
            Self::Hp2 => "hp2",
            Self::Hp3 => "hp3",
        })
    }
}

/// Everything a JPEG-LS stream declares before its entropy-coded data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerHeader {
    pub spiff: Option<SpiffHeader>,
    pub frame: FrameInfo,
    pub interleave_mode: InterleaveMode,
    pub near_lossless: u8,
    pub preset_coding_parameters: Option<PresetCodingParameters>,
    pub color_transformation: Option<ColorTransformation>,
    pub comment: String,
    /// Offset of the first SOS marker's `0xFF`.
    pub scan_offset: usize,
    /// Offset of the first entropy-coded byte.
    pub data_offset: usize,
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], JlstError> {
        let out = self
            .data
            .get(self.pos..self.pos + n)
            .ok_or(JlstError::UnexpectedEof)?;
        self.pos += n;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, JlstError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, JlstError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Next marker code, skipping `0xFF` fill bytes.
    fn marker(&mut self) -> Result<u8, JlstError> {
        if self.u8()? != 0xFF {
            return Err(JlstError::MalformedHeader(format!(
                "expected marker at offset {}",
                self.pos - 1
            )));
        }
        loop {
            match self.u8()? {
                0xFF => continue,
                code => return Ok(code),
            }
        }
    }

    /// Payload of a length-prefixed segment.
    fn segment(&mut self) -> Result<&'a [u8], JlstError> {
        let len = usize::from(self.u16()?);
        if len < 2 {
            return Err(JlstError::MalformedHeader(format!(
                "segment length {len} at offset {}",
                self.pos - 2
            )));
        }
        self.take(len - 2)
    }
}

fn be16(b: &[u8], i: usize) -> Result<u16, JlstError> {
    b.get(i..i + 2)
        .map(|s| u16::from_be_bytes([s[0], s[1]]))
        .ok_or(JlstError::UnexpectedEof)
}

/// Walk the marker segments of `bytes` up to and including the first SOS.
pub fn read_header(bytes: &[u8]) -> Result<ContainerHeader, JlstError> {
    let mut r = Reader { data: bytes, pos: 0 };
    if r.marker()? != SOI {
        return Err(JlstError::MalformedHeader("missing start of image".into()));
    }

    let mut header = ContainerHeader::default();
    let mut frame_seen = false;
    let mut first_segment = true;
    let mut oversize: Option<(u32, u32)> = None;

    loop {
        let at = r.pos;
        let code = r.marker()?;
        trace!(marker = code, offset = at, "segment");
        match code {
            APP8 => {
                let payload = r.segment()?;
                if first_segment && payload.starts_with(SPIFF_MAGIC) {
                    header.spiff = Some(SpiffHeader::parse(payload)?);
                } else if payload.len() == MRFX.len() + 1 && payload.starts_with(MRFX) {
                    let t = payload[MRFX.len()];
                    header.color_transformation =
                        Some(ColorTransformation::from_byte(t).ok_or_else(|| {
                            JlstError::MalformedHeader(format!("colour transformation {t}"))
                        })?);
                }
            }
            COM => {
                header.comment = String::from_utf8_lossy(r.segment()?).into_owned();
            }
            LSE => {
                let payload = r.segment()?;
                match payload.first() {
                    Some(&LSE_PRESET_PARAMETERS) => {
                        header.preset_coding_parameters = Some(PresetCodingParameters {
                            maximum_sample_value: be16(payload, 1)?,
                            threshold1: be16(payload, 3)?,
                            threshold2: be16(payload, 5)?,
                            threshold3: be16(payload, 7)?,
                            reset_value: be16(payload, 9)?,
                        });
                    }
                    Some(&LSE_OVERSIZE_DIMENSION) => {
                        let wxy = usize::from(*payload.get(1).ok_or(JlstError::UnexpectedEof)?);
                        let field = |i: usize| -> Result<u32, JlstError> {
                            let s = payload
                                .get(2 + i * wxy..2 + (i + 1) * wxy)
                                .ok_or(JlstError::UnexpectedEof)?;
                            Ok(s.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
                        };
                        oversize = Some((field(1)?, field(0)?));
                    }
                    // mapping tables
                    _ => {}
                }
            }
            SOF55 => {
                let p = r.segment()?;
                if p.len() < 6 {
                    return Err(JlstError::UnexpectedEof);
                }
                let bits = p[0];
                let count = p[5];
                if !(2..=16).contains(&bits) || count == 0 {
                    return Err(JlstError::MalformedHeader(format!(
                        "frame with {bits} bits and {count} components"
                    )));
                }
                header.frame = FrameInfo::new(
                    u32::from(be16(p, 3)?),
                    u32::from(be16(p, 1)?),
                    bits,
                    count,
                );
                frame_seen = true;
            }
            SOS => {
                if !frame_seen {
                    return Err(JlstError::MalformedHeader("scan before frame header".into()));
                }
                let p = r.segment()?;
                let ns = usize::from(*p.first().ok_or(JlstError::UnexpectedEof)?);
                let fields = p.get(1 + 2 * ns..1 + 2 * ns + 3).ok_or(JlstError::UnexpectedEof)?;
                header.near_lossless = fields[0];
                header.interleave_mode = InterleaveMode::from_ilv(fields[1]).ok_or_else(|| {
                    JlstError::MalformedHeader(format!("interleave mode {}", fields[1]))
                })?;
                header.scan_offset = at;
                header.data_offset = r.pos;
                break;
            }
            0xE0..=0xEF | 0xDD => {
                r.segment()?;
            }
            SOI | EOI => {
                return Err(JlstError::MalformedHeader(format!(
                    "unexpected marker 0xFF{code:02X} at offset {at}"
                )));
            }
            0xC0..=0xCF => {
                return Err(JlstError::MalformedHeader(format!(
                    "not a JPEG-LS frame (0xFF{code:02X})"
                )));
            }
            _ => {
                return Err(JlstError::MalformedHeader(format!(
                    "unknown marker 0xFF{code:02X} at offset {at}"
                )));
            }
        }
        first_segment = false;
    }

    if let Some((width, height)) = oversize {
        if header.frame.width == 0 {
            header.frame.width = width;
        }
        if header.frame.height == 0 {
            header.frame.height = height;
        }
    }
    if header.frame.width == 0 || header.frame.height == 0 {
        return Err(JlstError::MalformedHeader(format!(
            "frame size {}x{}",
            header.frame.width, header.frame.height
        )));
    }
    Ok(header)
}

impl ContainerHeader {
    /// Serialise SOI through the first SOS, components numbered from 1.
    ///
    /// The scan header lists every component.
    pub fn write(&self, dest: &mut Vec<u8>) -> Result<(), JlstError> {
        let frame = &self.frame;
        let (Ok(width), Ok(height)) = (u16::try_from(frame.width), u16::try_from(frame.height))
        else {
            return Err(JlstError::DimensionsTooLarge {
                width: frame.width,
                height: frame.height,
            });
        };
        dest.extend_from_slice(&[0xFF, SOI]);
        if let Some(spiff) = &self.spiff {
            spiff.write(dest);
        }
        if !self.comment.is_empty() {
            let text = self.comment.as_bytes();
            let len = u16::try_from(text.len() + 2).map_err(|_| {
                JlstError::UnsupportedGeometry(format!("{}-byte comment", text.len()))
            })?;
            dest.extend_from_slice(&[0xFF, COM]);
            dest.extend_from_slice(&len.to_be_bytes());
            dest.extend_from_slice(text);
        }
        if let Some(t) = self.color_transformation {
            dest.extend_from_slice(&[0xFF, APP8, 0x00, 0x07]);
            dest.extend_from_slice(MRFX);
            dest.push(t.as_byte());
        }
        if let Some(pc) = &self.preset_coding_parameters {
            dest.extend_from_slice(&pc.to_segment());
        }

        let count = frame.component_count;
        dest.extend_from_slice(&[0xFF, SOF55]);
        dest.extend_from_slice(&(8 + 3 * u16::from(count)).to_be_bytes());
        dest.push(frame.bits_per_sample);
        dest.extend_from_slice(&height.to_be_bytes());
        dest.extend_from_slice(&width.to_be_bytes());
        dest.push(count);
        for id in 1..=count {
            dest.extend_from_slice(&[id, 0x11, 0x00]);
        }

        dest.extend_from_slice(&[0xFF, SOS]);
        dest.extend_from_slice(&(6 + 2 * u16::from(count)).to_be_bytes());
        dest.push(count);
        for id in 1..=count {
            dest.extend_from_slice(&[id, 0x00]);
        }
        dest.extend_from_slice(&[self.near_lossless, self.interleave_mode.ilv(), 0x00]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn sample() -> ContainerHeader {
        ContainerHeader {
            spiff: Some(SpiffHeader::standard(&FrameInfo::new(5, 4, 12, 3))),
            frame: FrameInfo::new(5, 4, 12, 3),
            interleave_mode: InterleaveMode::Sample,
            near_lossless: 2,
            preset_coding_parameters: Some(PresetCodingParameters {
                maximum_sample_value: 4095,
                threshold1: 18,
                threshold2: 67,
                threshold3: 276,
                reset_value: 64,
            }),
            color_transformation: Some(ColorTransformation::Hp1),
            comment: "scanner 7".into(),
            ..Default::default()
        }
    }

    #[test]
    fn written_header_reads_back() {
        let mut bytes = Vec::new();
        sample().write(&mut bytes).unwrap();
        bytes.extend_from_slice(&[0xAA, 0xBB, 0xFF, EOI]);

        let parsed = read_header(&bytes).unwrap();
        assert_eq!(parsed.data_offset, bytes.len() - 4);
        assert_eq!(&bytes[parsed.scan_offset..][..2], [0xFF, SOS]);
        let expected = ContainerHeader {
            scan_offset: parsed.scan_offset,
            data_offset: parsed.data_offset,
            ..sample()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn jai_parameters_match_known_segments() {
        assert_eq!(
            PresetCodingParameters::jai(13).unwrap().to_segment(),
            [0xFF, 0xF8, 0x00, 0x0D, 0x01, 0x1F, 0xFF, 0x00, 0x22, 0x00, 0x83, 0x02, 0x24, 0x00, 0x40]
        );
        assert_eq!(
            PresetCodingParameters::jai(16).unwrap().to_segment(),
            [0xFF, 0xF8, 0x00, 0x0D, 0x01, 0xFF, 0xFF, 0x01, 0x02, 0x04, 0x03, 0x11, 0x04, 0x00, 0x40]
        );
        assert!(PresetCodingParameters::jai(12).is_none());
    }

    #[test]
    fn rejects_non_jpeg_ls() {
        // baseline JPEG SOF0
        let bytes = [0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x0B, 8, 0, 1, 0, 1, 1, 1, 0x11, 0];
        assert!(matches!(read_header(&bytes), Err(JlstError::MalformedHeader(_))));
        assert!(matches!(read_header(b"P5\n"), Err(JlstError::MalformedHeader(_))));
    }

    #[test]
    fn truncated_is_eof() {
        let mut bytes = Vec::new();
        sample().write(&mut bytes).unwrap();
        for cut in [3, 20, bytes.len() - 1] {
            assert!(read_header(&bytes[..cut]).is_err(), "cut at {cut}");
        }
        assert!(matches!(read_header(&[0xFF, 0xD8]), Err(JlstError::UnexpectedEof)));
    }

    #[test]
    fn fill_bytes_before_marker() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF];
        let mut rest = Vec::new();
        ContainerHeader {
            frame: FrameInfo::new(1, 1, 8, 1),
            ..Default::default()
        }
        .write(&mut rest)
        .unwrap();
        bytes.extend_from_slice(&rest[2..]);
        assert_eq!(read_header(&bytes).unwrap().frame, FrameInfo::new(1, 1, 8, 1));
    }
}
