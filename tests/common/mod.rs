#![allow(dead_code)]

use zenjlst::jls::{ContainerHeader, DecodedFrame, JpeglsCodec, SpiffHeader, read_header};
use zenjlst::{EncodeOptions, FrameInfo, Image, ImageInfo, InterleaveMode, JlstError};

/// Stores samples uncompressed behind a real JPEG-LS marker header, so the
/// container and patching code can be exercised without an entropy coder.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoredCodec;

impl JpeglsCodec for StoredCodec {
    fn encode(
        &self,
        frame: &FrameInfo,
        options: &EncodeOptions,
        pixels: &[u8],
        stride: usize,
    ) -> Result<Vec<u8>, JlstError> {
        let interleave_mode = options.interleave_mode.unwrap_or_default();
        let header = ContainerHeader {
            spiff: options
                .standard_spiff_header
                .then(|| SpiffHeader::standard(frame)),
            frame: *frame,
            interleave_mode,
            near_lossless: options.near_lossless,
            preset_coding_parameters: options.preset_coding_parameters,
            color_transformation: options.color_transformation,
            comment: options.comment.clone().unwrap_or_default(),
            ..Default::default()
        };
        let mut out = Vec::new();
        header.write(&mut out)?;

        let planar = frame.component_count > 1 && interleave_mode == InterleaveMode::None;
        let (lines, row) = if planar {
            (
                frame.height as usize * usize::from(frame.component_count),
                frame.width as usize * frame.bytes_per_sample(),
            )
        } else {
            (frame.height as usize, frame.tight_stride())
        };
        let stride = if stride == 0 { row } else { stride };
        for line in 0..lines {
            out.extend_from_slice(&pixels[line * stride..][..row]);
        }
        out.extend_from_slice(&[0xFF, 0xD9]);
        Ok(out)
    }

    fn decode(&self, encoded: &[u8]) -> Result<DecodedFrame, JlstError> {
        let header = read_header(encoded)?;
        let len = header.frame.buffer_len()?;
        let pixels = encoded
            .get(header.data_offset..header.data_offset + len)
            .ok_or(JlstError::UnexpectedEof)?
            .to_vec();
        Ok(DecodedFrame {
            frame: header.frame,
            interleave_mode: header.interleave_mode,
            comment: header.comment,
            pixels,
        })
    }
}

pub fn gray8(width: u32, height: u32, pixels: &[u8]) -> Image {
    let info = ImageInfo::new(FrameInfo::new(width, height, 8, 1), InterleaveMode::None);
    Image::from_pixels(info, pixels.to_vec()).unwrap()
}

/// `width x height` image whose samples count up from 1, wrapping at the
/// maximum sample value.
pub fn counting(
    width: u32,
    height: u32,
    bits: u8,
    components: u8,
    mode: InterleaveMode,
) -> Image {
    let frame = FrameInfo::new(width, height, bits, components);
    let max = frame.max_sample_value();
    let samples = width as usize * height as usize * usize::from(components);
    let mut pixels = Vec::with_capacity(frame.buffer_len().unwrap());
    for i in 0..samples {
        let v = (i as u32 + 1) % (max + 1);
        if bits > 8 {
            pixels.extend_from_slice(&(v as u16).to_le_bytes());
        } else {
            pixels.push(v as u8);
        }
    }
    Image::from_pixels(ImageInfo::new(frame, mode), pixels).unwrap()
}
