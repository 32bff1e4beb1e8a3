use alloc::string::String;
use enough::StopReason;

/// Errors from format dispatch, pixel transforms and bitstream patching.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JlstError {
    #[error("no registered format recognizes the input")]
    FormatDetectionFailed,

    #[error("unknown format type: {0}")]
    UnknownFormatType(String),

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("missing size: raw input needs width and height")]
    MissingSize,

    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("cannot find marker 0xFF{0:02X}")]
    MarkerNotFound(u8),

    #[error("inconsistent container: {0}")]
    InconsistentContainer(String),

    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("region {width}x{height}+{x}+{y} exceeds image {image_width}x{image_height}")]
    InvalidRegion {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("format priority {0} outside [0, 1]")]
    InvalidPriority(f32),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for JlstError {
    fn from(r: StopReason) -> Self {
        JlstError::Cancelled(r)
    }
}
