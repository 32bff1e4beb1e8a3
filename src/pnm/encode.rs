use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use enough::Stop;

use super::CommentStyle;
use crate::error::JlstError;
use crate::image::{Image, ImageInfo};
use crate::pixel::InterleaveMode;

pub(crate) fn write_header(
    dest: &mut Vec<u8>,
    info: &ImageInfo,
    style: CommentStyle,
) -> Result<(), JlstError> {
    let frame = &info.frame;
    let magic = match frame.component_count {
        1 => "P5",
        3 => "P6",
        n => {
            return Err(JlstError::UnsupportedGeometry(format!(
                "PNM cannot store {n} components"
            )));
        }
    };
    if !(1..=16).contains(&frame.bits_per_sample) {
        return Err(JlstError::UnsupportedGeometry(format!(
            "PNM cannot store {} bits per sample",
            frame.bits_per_sample
        )));
    }

    let mut header = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(header, "{magic}");
    if !info.comment.is_empty() {
        match style {
            CommentStyle::Lines => {
                for line in info.comment.split('\n') {
                    let _ = writeln!(header, "#{line}");
                }
            }
            CommentStyle::Tokens => {
                for token in info.comment.split_whitespace() {
                    let _ = writeln!(header, "#{token}");
                }
            }
        }
    }
    let _ = writeln!(header, "{} {}", frame.width, frame.height);
    let _ = writeln!(header, "{}", frame.max_sample_value());
    dest.extend_from_slice(header.as_bytes());
    Ok(())
}

/// Emit samples pixel-interleaved; planar RGB is interleaved first.
pub(crate) fn write_samples(
    dest: &mut Vec<u8>,
    image: &Image,
    stop: &dyn Stop,
) -> Result<(), JlstError> {
    let target = match image.info.interleave_mode {
        InterleaveMode::None => InterleaveMode::Sample,
        other => other,
    };
    image.write_big_endian(target, dest, stop)
}
