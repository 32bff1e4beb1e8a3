use alloc::format;
use alloc::string::String;

use enough::Stop;
use tracing::trace;

use super::PnmOptions;
use crate::error::JlstError;
use crate::image::{Image, ImageInfo};
use crate::pixel::{FrameInfo, InterleaveMode};
use crate::source::Source;

/// Parse the magic, comment, size and maxval lines.
pub(crate) fn parse_header(
    source: &mut Source<'_>,
    options: &PnmOptions,
) -> Result<ImageInfo, JlstError> {
    let magic = source.read_line()?;
    let (component_count, interleave_mode) = match magic.as_str() {
        "P5" => (1, InterleaveMode::None),
        "P6" => (3, InterleaveMode::Sample),
        other => {
            return Err(JlstError::MalformedHeader(format!(
                "unsupported PNM magic {other:?}"
            )));
        }
    };

    let mut comment = String::new();
    while source.peek() == Some(b'#') {
        let line = source.read_line()?;
        let text = &line[1..];
        let text = if options.trim_comments { text.trim() } else { text };
        if !comment.is_empty() {
            comment.push('\n');
        }
        comment.push_str(text);
    }

    let size = source.read_line()?;
    let mut fields = size
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let width = parse_dimension(fields.next(), "width")?;
    let height = parse_dimension(fields.next(), "height")?;

    let maxval_line = source.read_line()?;
    let maxval: u32 = maxval_line
        .trim()
        .parse()
        .map_err(|_| JlstError::MalformedHeader(format!("bad maxval {maxval_line:?}")))?;
    if !(1..=65535).contains(&maxval) {
        return Err(JlstError::MalformedHeader(format!(
            "maxval {maxval} outside 1..=65535"
        )));
    }
    // smallest width that holds 0..=maxval
    let bits_per_sample = (u32::BITS - maxval.leading_zeros()) as u8;

    trace!(width, height, maxval, component_count, "parsed PNM header");
    let frame = FrameInfo::new(width, height, bits_per_sample, component_count);
    Ok(ImageInfo::new(frame, interleave_mode).with_comment(comment))
}

fn parse_dimension(field: Option<&str>, what: &str) -> Result<u32, JlstError> {
    let field = field.ok_or_else(|| JlstError::MalformedHeader(format!("missing {what}")))?;
    match field.parse::<u32>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(JlstError::MalformedHeader(format!("bad {what} {field:?}"))),
    }
}

/// Read exactly the pre-sized buffer's worth of samples.
pub(crate) fn read_samples(
    source: &mut Source<'_>,
    image: &mut Image,
    stop: &dyn Stop,
) -> Result<(), JlstError> {
    let body = source.read_exact(image.data.pixels.len())?;
    image.read_big_endian(body, stop)
}
