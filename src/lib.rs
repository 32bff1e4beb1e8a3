//! # zenjlst
//!
//! Container plumbing around a JPEG-LS codec: PNM and RAW readers/writers,
//! format detection, pixel layout conversion, lossless geometric
//! transforms and edits on already encoded JPEG-LS streams.
//!
//! ## Formats
//!
//! - **PNM** P5 (grayscale) and P6 (RGB), 1 to 16 bits per sample
//! - **RAW** headerless sample dumps, geometry from caller hints
//! - **JPEG-LS** container: SPIFF, SOF55, LSE, COM, `mrfx` and SOS segments
//!   are parsed natively; pixel data goes through a [`jls::JpeglsCodec`]
//!
//! ## Bitstream patching
//!
//! [`jls::patch`] edits encoded streams without touching entropy-coded
//! data: inserting preset coding parameters (`fix_jai`), retrofitting a
//! SPIFF header (`fix_spiff`), overwriting the NEAR byte, and lossless
//! crop / flip / rotate / transpose / transverse / wipe (`transform`).
//!
//! ## Non-Goals
//!
//! - JPEG-LS entropy coding itself (bring your own [`jls::JpeglsCodec`])
//! - ASCII PNM (P1, P2, P3), PAM, PFM
//! - A general-purpose image library
//!
//! ## Usage
//!
//! ```
//! use zenjlst::{LoadRequest, Registry, SaveRequest, TransformRequest, Rotation, Unstoppable};
//! use zenjlst::jls::NoCodec;
//!
//! let registry = Registry::builtin(NoCodec);
//! let pgm = b"P5\n3 2\n255\n\x01\x02\x03\x04\x05\x06";
//!
//! let image = LoadRequest::new(pgm).load(&registry, Unstoppable)?;
//! let rotated = TransformRequest::Rotate(Rotation::Deg90).apply(&image)?;
//! assert_eq!((rotated.info.frame.width, rotated.info.frame.height), (2, 3));
//!
//! let out = SaveRequest::new("pgm").save(&registry, &rotated, Unstoppable)?;
//! assert_eq!(out, b"P5\n2 3\n255\n\x04\x01\x05\x02\x06\x03");
//! # Ok::<(), zenjlst::JlstError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod image;
mod limits;
mod pixel;
mod registry;
mod request;
mod source;

pub mod geometry;
pub mod jls;
pub mod layout;
pub mod pnm;
pub mod raw;

// Re-exports
pub use enough::{Stop, Unstoppable};
pub use error::JlstError;
pub use geometry::{Flip, Region, Rotation, TransformRequest};
pub use image::{Image, ImageData, ImageInfo};
pub use jls::EncodeOptions;
pub use limits::Limits;
#[cfg(feature = "rgb")]
pub use pixel::ImagePixel;
pub use pixel::{FrameInfo, InterleaveMode};
pub use registry::{FormatHandler, FormatKind, Registry};
pub use request::{LoadRequest, SaveRequest};
pub use source::Source;
