//! Edits on encoded JPEG-LS streams that leave the scan data alone.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use tracing::debug;

use super::header::{APP8, SOI, SOS, read_header};
use super::spiff::STANDARD_SPIFF_LEN;
use super::{EncodeOptions, JpeglsCodec, PresetCodingParameters, check_decoded, encode_image};
use crate::error::JlstError;
use crate::geometry::TransformRequest;
use crate::image::{Image, ImageData, ImageInfo};

/// Offset just past the first `0xFF, marker` pair in `bytes`.
pub fn find_marker(bytes: &[u8], marker: u8) -> Result<usize, JlstError> {
    bytes
        .windows(2)
        .position(|w| w == [0xFF, marker])
        .map(|at| at + 2)
        .ok_or(JlstError::MarkerNotFound(marker))
}

/// Overwrite the NEAR byte of the first scan header.
///
/// Assumes a three-component scan header, where NEAR sits 9 bytes past the
/// SOS marker; the segment is not reparsed.
pub fn patch_header(bytes: &mut [u8], near: u8) -> Result<(), JlstError> {
    let pos = find_marker(bytes, SOS)?;
    let slot = bytes.get_mut(pos + 9).ok_or(JlstError::UnexpectedEof)?;
    *slot = near;
    Ok(())
}

/// Insert the preset coding parameters some decoders need for 13..=16 bit
/// streams, right before the first scan header.
pub fn fix_jai(source: &[u8]) -> Result<Vec<u8>, JlstError> {
    let header = read_header(source)?;
    let bits = header.frame.bits_per_sample;
    let segment = PresetCodingParameters::jai(bits)
        .ok_or_else(|| JlstError::UnsupportedGeometry(format!("{bits} bits per sample")))?
        .to_segment();
    let at = find_marker(source, SOS)? - 2;

    let mut out = Vec::with_capacity(source.len() + segment.len());
    out.extend_from_slice(&source[..at]);
    out.extend_from_slice(&segment);
    out.extend_from_slice(&source[at..]);
    debug!(bits, offset = at, "inserted preset coding parameters");
    Ok(out)
}

/// Retrofit a standard SPIFF header onto a stream written without one.
///
/// The header bytes come from `codec` encoding a black frame of the same
/// geometry, so they match what the encoder would have written itself.
pub fn fix_spiff(source: &[u8], codec: &dyn JpeglsCodec) -> Result<Vec<u8>, JlstError> {
    let header = read_header(source)?;
    if header.spiff.is_some() {
        return Err(JlstError::InconsistentContainer(
            "stream already carries a SPIFF header".into(),
        ));
    }
    let frame = header.frame;
    let black = Image {
        info: ImageInfo::new(frame, header.interleave_mode),
        data: ImageData {
            stride: 0,
            pixels: vec![0; frame.buffer_len()?],
        },
    };
    let options = EncodeOptions::default().with_standard_spiff_header(true);
    let reference = encode_image(codec, &black, &options)?;
    let start = find_marker(&reference, APP8)? - 2;
    let spiff = reference
        .get(start..start + STANDARD_SPIFF_LEN)
        .ok_or(JlstError::UnexpectedEof)?;

    // fill bytes may precede SOI; keep them and splice after the marker
    let soi_end = find_marker(source, SOI)?;
    let mut out = Vec::with_capacity(source.len() + spiff.len());
    out.extend_from_slice(&source[..soi_end]);
    out.extend_from_slice(spiff);
    out.extend_from_slice(&source[soi_end..]);
    debug!(width = frame.width, height = frame.height, "inserted SPIFF header");
    Ok(out)
}

/// Decode, apply `request` and re-encode losslessly with the source's
/// interleave mode, preset parameters, colour transformation and SPIFF
/// presence.
///
/// Near-lossless sources are rejected: restoring their NEAR value after a
/// lossless re-encode is not implemented.
pub fn transform(
    source: &[u8],
    request: &TransformRequest,
    codec: &dyn JpeglsCodec,
) -> Result<Vec<u8>, JlstError> {
    let header = read_header(source)?;
    if header.near_lossless != 0 {
        return Err(JlstError::Unimplemented(
            "transforming near-lossless streams",
        ));
    }
    let decoded = codec.decode(source)?;
    check_decoded(&decoded, &header.frame)?;
    let input = Image {
        info: ImageInfo::new(decoded.frame, decoded.interleave_mode).with_comment(decoded.comment),
        data: ImageData {
            stride: 0,
            pixels: decoded.pixels,
        },
    };
    let output = request.apply(&input)?;

    let options = EncodeOptions {
        interleave_mode: Some(decoded.interleave_mode),
        near_lossless: 0,
        preset_coding_parameters: header.preset_coding_parameters,
        color_transformation: header.color_transformation,
        standard_spiff_header: header.spiff.is_some(),
        comment: None,
    };
    debug!(
        request = ?request,
        width = output.info.frame.width,
        height = output.info.frame.height,
        "transformed stream"
    );
    encode_image(codec, &output, &options)
}
