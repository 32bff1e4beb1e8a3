mod common;

use common::{StoredCodec, counting, gray8};
use enough::{Stop, StopReason, Unstoppable};
use zenjlst::jls::NoCodec;
use zenjlst::raw::{PlanarConfiguration, RawFormat};
use zenjlst::*;

struct Cancelled;

impl Stop for Cancelled {
    fn check(&self) -> Result<(), StopReason> {
        Err(StopReason::Cancelled)
    }
}

#[test]
fn pgm_roundtrip_gray8() {
    let registry = Registry::builtin(NoCodec);
    let image = gray8(3, 2, &[0, 64, 128, 192, 255, 100]);

    let encoded = SaveRequest::new("pgm")
        .save(&registry, &image, Unstoppable)
        .unwrap();
    assert!(encoded.starts_with(b"P5\n3 2\n255\n"));

    let decoded = LoadRequest::new(&encoded).load(&registry, Unstoppable).unwrap();
    assert_eq!(decoded.info, image.info);
    assert_eq!(decoded.pixels(), image.pixels());
}

#[test]
fn pgm_16bit_is_big_endian_on_disk() {
    let registry = Registry::builtin(NoCodec);
    let info = ImageInfo::new(FrameInfo::new(2, 1, 16, 1), InterleaveMode::None);
    let image = Image::from_pixels(info, vec![0x34, 0x12, 0xCD, 0xAB]).unwrap();

    let encoded = SaveRequest::new("pgm")
        .save(&registry, &image, Unstoppable)
        .unwrap();
    assert_eq!(encoded, b"P5\n2 1\n65535\n\x12\x34\xAB\xCD");

    let decoded = LoadRequest::new(&encoded).load(&registry, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &[0x34, 0x12, 0xCD, 0xAB]);
}

#[test]
fn maxval_sets_bit_depth() {
    let registry = Registry::builtin(NoCodec);
    let decoded = LoadRequest::new(b"P5\n1 1\n1023\n\x03\xFF")
        .load(&registry, Unstoppable)
        .unwrap();
    assert_eq!(decoded.info.frame.bits_per_sample, 10);
    assert_eq!(decoded.pixels(), &[0xFF, 0x03]);
}

#[test]
fn ppm_from_planar_source() {
    let registry = Registry::builtin(NoCodec);
    // planes R = [1, 2], G = [3, 4], B = [5, 6]
    let planar = counting(2, 1, 8, 3, InterleaveMode::None);

    let encoded = SaveRequest::new("ppm")
        .save(&registry, &planar, Unstoppable)
        .unwrap();
    assert_eq!(encoded, b"P6\n2 1\n255\n\x01\x03\x05\x02\x04\x06");

    let decoded = LoadRequest::new(&encoded).load(&registry, Unstoppable).unwrap();
    assert_eq!(decoded.info.interleave_mode, InterleaveMode::Sample);
    assert_eq!(decoded.pixels_in(InterleaveMode::None).unwrap(), planar.pixels());
}

#[test]
fn pnm_comment_survives() {
    let registry = Registry::builtin(NoCodec);
    let image = Image {
        info: gray8(1, 1, &[7]).info.with_comment("line one\nline two"),
        ..gray8(1, 1, &[7])
    };
    let encoded = SaveRequest::new("pgm")
        .save(&registry, &image, Unstoppable)
        .unwrap();
    let decoded = LoadRequest::new(&encoded).load(&registry, Unstoppable).unwrap();
    assert_eq!(decoded.info.comment, "line one\nline two");
}

#[test]
fn raw_geometry_inferred_from_size() {
    let registry = Registry::builtin(NoCodec);
    let hints = ImageInfo::hints(10, 10);
    let cases = [(100, 8, 1), (200, 16, 1), (300, 8, 3), (600, 16, 3)];
    for (size, bits, components) in cases {
        let data = vec![0u8; size];
        let image = LoadRequest::new(&data)
            .with_hints(hints.clone())
            .load(&registry, Unstoppable)
            .unwrap();
        assert_eq!(
            image.info.frame,
            FrameInfo::new(10, 10, bits, components),
            "{size} bytes"
        );
    }

    let odd = vec![0u8; 150];
    let err = LoadRequest::new(&odd)
        .with_hints(hints)
        .load(&registry, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, JlstError::FormatDetectionFailed));
}

#[test]
fn raw_needs_size_hints() {
    let registry = Registry::builtin(NoCodec);
    let err = LoadRequest::new(&[0u8; 16])
        .with_type("raw")
        .load(&registry, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, JlstError::MissingSize));
}

#[test]
fn raw_separate_planes() {
    let mut registry = Registry::new();
    let separate = RawFormat::default().with_planar_configuration(PlanarConfiguration::Separate);
    registry.register(Box::new(separate), 1.0).unwrap();

    let interleaved = counting(2, 1, 8, 3, InterleaveMode::Sample);
    let encoded = SaveRequest::new("raw")
        .save(&registry, &interleaved, Unstoppable)
        .unwrap();
    // [R G B R G B] written as [R R G G B B]
    assert_eq!(encoded, [1, 4, 2, 5, 3, 6]);

    let decoded = LoadRequest::new(&encoded)
        .with_type("raw")
        .with_hints(ImageInfo::hints(2, 1))
        .load(&registry, Unstoppable)
        .unwrap();
    assert_eq!(decoded.info.interleave_mode, InterleaveMode::None);
    assert_eq!(
        decoded.pixels_in(InterleaveMode::Sample).unwrap(),
        interleaved.pixels()
    );
}

#[test]
fn raw_16bit_roundtrip() {
    let registry = Registry::builtin(NoCodec);
    let image = counting(3, 2, 16, 3, InterleaveMode::Sample);
    let encoded = SaveRequest::new("raw")
        .save(&registry, &image, Unstoppable)
        .unwrap();
    assert_eq!(encoded.len(), 36);
    assert_eq!(&encoded[..6], [0, 1, 0, 2, 0, 3]);

    let decoded = LoadRequest::new(&encoded)
        .with_type("raw")
        .with_hints(ImageInfo::hints(3, 2))
        .load(&registry, Unstoppable)
        .unwrap();
    assert_eq!(decoded.frame(), &FrameInfo::new(3, 2, 16, 3));
    assert_eq!(decoded.info.interleave_mode, InterleaveMode::Sample);
    assert_eq!(decoded, image);
}

#[test]
fn jls_roundtrip_through_codec() {
    let registry = Registry::builtin(StoredCodec);
    for mode in [InterleaveMode::Sample, InterleaveMode::Line, InterleaveMode::None] {
        let image = counting(3, 2, 12, 3, InterleaveMode::Sample);
        let options = EncodeOptions::default().with_interleave_mode(mode);
        let encoded = SaveRequest::new("jls")
            .with_options(options)
            .save(&registry, &image, Unstoppable)
            .unwrap();

        let decoded = LoadRequest::new(&encoded).load(&registry, Unstoppable).unwrap();
        assert_eq!(decoded.info.interleave_mode, mode, "{mode:?}");
        assert_eq!(
            decoded.pixels_in(InterleaveMode::Sample).unwrap(),
            image.pixels(),
            "{mode:?}"
        );
    }
}

#[test]
fn jls_header_carries_options() {
    let registry = Registry::builtin(StoredCodec);
    let image = Image {
        info: counting(4, 4, 8, 3, InterleaveMode::Sample)
            .info
            .with_comment("from the scanner"),
        ..counting(4, 4, 8, 3, InterleaveMode::Sample)
    };
    let options = EncodeOptions::default()
        .with_near_lossless(3)
        .with_color_transformation(jls::ColorTransformation::Hp2);
    let encoded = SaveRequest::new("jls")
        .with_options(options)
        .save(&registry, &image, Unstoppable)
        .unwrap();

    let header = jls::read_header(&encoded).unwrap();
    assert!(header.spiff.is_some());
    assert_eq!(header.near_lossless, 3);
    assert_eq!(header.color_transformation, Some(jls::ColorTransformation::Hp2));
    assert_eq!(header.comment, "from the scanner");

    let decoded = LoadRequest::new(&encoded).load(&registry, Unstoppable).unwrap();
    assert_eq!(decoded.info.comment, "from the scanner");
}

#[test]
fn jls_option_conflicts() {
    let registry = Registry::builtin(StoredCodec);
    let gray = gray8(2, 2, &[1, 2, 3, 4]);

    let interleaved = EncodeOptions::default().with_interleave_mode(InterleaveMode::Sample);
    let err = SaveRequest::new("jls")
        .with_options(interleaved)
        .save(&registry, &gray, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, JlstError::UnsupportedGeometry(_)));

    let transformed =
        EncodeOptions::default().with_color_transformation(jls::ColorTransformation::Hp1);
    let err = SaveRequest::new("jls")
        .with_options(transformed)
        .save(&registry, &gray, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, JlstError::UnsupportedGeometry(_)));
}

#[test]
fn jls_info_without_codec() {
    let encoded = SaveRequest::new("jls")
        .save(
            &Registry::builtin(StoredCodec),
            &gray8(2, 2, &[1, 2, 3, 4]),
            Unstoppable,
        )
        .unwrap();

    let err = LoadRequest::new(&encoded)
        .load(&Registry::builtin(NoCodec), Unstoppable)
        .unwrap_err();
    assert!(matches!(err, JlstError::Unimplemented(_)));
}

#[test]
fn padded_stride_is_honoured() {
    let registry = Registry::builtin(StoredCodec);
    let image = Image {
        info: ImageInfo::new(FrameInfo::new(2, 2, 8, 1), InterleaveMode::None),
        data: ImageData {
            stride: 3,
            pixels: vec![1, 2, 0xEE, 3, 4, 0xEE],
        },
    };

    let pgm = SaveRequest::new("pgm")
        .save(&registry, &image, Unstoppable)
        .unwrap();
    assert_eq!(pgm, b"P5\n2 2\n255\n\x01\x02\x03\x04");

    let jls = SaveRequest::new("jls")
        .save(&registry, &image, Unstoppable)
        .unwrap();
    let decoded = LoadRequest::new(&jls).load(&registry, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &[1, 2, 3, 4]);
}

#[test]
fn limits_checked_before_allocation() {
    let registry = Registry::builtin(NoCodec);
    let pgm = b"P5\n3 2\n255\n\x01\x02\x03\x04\x05\x06";

    let tight = Limits::default().with_max_pixels(4);
    let err = LoadRequest::new(pgm)
        .with_limits(&tight)
        .load(&registry, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, JlstError::LimitExceeded(_)));

    let narrow = Limits::default().with_max_size(2, 100);
    assert!(LoadRequest::new(pgm).with_limits(&narrow).load(&registry, Unstoppable).is_err());

    let roomy = Limits::default().with_max_memory(6);
    assert!(LoadRequest::new(pgm).with_limits(&roomy).load(&registry, Unstoppable).is_ok());
}

#[test]
fn cancellation_is_reported() {
    let registry = Registry::builtin(NoCodec);
    let err = LoadRequest::new(b"P5\n1 1\n255\n\x00")
        .load(&registry, Cancelled)
        .unwrap_err();
    assert!(matches!(err, JlstError::Cancelled(StopReason::Cancelled)));

    let err = SaveRequest::new("pgm")
        .save(&registry, &gray8(1, 1, &[0]), Cancelled)
        .unwrap_err();
    assert!(matches!(err, JlstError::Cancelled(_)));
}

#[test]
fn truncated_pnm_body() {
    let registry = Registry::builtin(NoCodec);
    let err = LoadRequest::new(b"P5\n2 2\n255\n\x01\x02")
        .load(&registry, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, JlstError::UnexpectedEof));
}

#[test]
fn file_roundtrip() {
    let registry = Registry::builtin(StoredCodec);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("counting.jls");

    let image = counting(5, 3, 16, 1, InterleaveMode::None);
    let encoded = SaveRequest::new("jls")
        .save(&registry, &image, Unstoppable)
        .unwrap();
    std::fs::write(&path, &encoded).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let decoded = LoadRequest::new(&bytes).load(&registry, Unstoppable).unwrap();
    assert_eq!(decoded, image);
}
