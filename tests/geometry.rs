mod common;

use common::{counting, gray8};
use zenjlst::layout::{planar_to_triplet, triplet_to_planar};
use zenjlst::*;

fn apply_all(image: &Image, requests: &[TransformRequest]) -> Image {
    requests
        .iter()
        .fold(image.clone(), |acc, r| r.apply(&acc).unwrap())
}

#[test]
fn rotations_compose() {
    use Rotation::*;
    for bits in [8, 16] {
        for components in [1, 3] {
            let mode = match components {
                1 => InterleaveMode::None,
                _ => InterleaveMode::Sample,
            };
            let image = counting(5, 3, bits, components, mode);
            let r90 = TransformRequest::Rotate(Deg90);
            let r180 = TransformRequest::Rotate(Deg180);
            let r270 = TransformRequest::Rotate(Deg270);

            assert_eq!(apply_all(&image, &[r90, r270]), image, "{bits} bits");
            assert_eq!(apply_all(&image, &[r180, r180]), image, "{bits} bits");
            assert_eq!(apply_all(&image, &[r90, r90]), r180.apply(&image).unwrap());
            assert_eq!(apply_all(&image, &[r90, r90, r90, r90]), image);
        }
    }
}

#[test]
fn rotation_swaps_dimensions() {
    let image = counting(5, 3, 8, 1, InterleaveMode::None);
    let rotated = TransformRequest::Rotate(Rotation::Deg90).apply(&image).unwrap();
    assert_eq!((rotated.frame().width, rotated.frame().height), (3, 5));
    let flipped = TransformRequest::Rotate(Rotation::Deg180).apply(&image).unwrap();
    assert_eq!((flipped.frame().width, flipped.frame().height), (5, 3));
}

#[test]
fn mirrors_are_involutions() {
    for request in [
        TransformRequest::Transpose,
        TransformRequest::Transverse,
        TransformRequest::Flip(Flip::Horizontal),
        TransformRequest::Flip(Flip::Vertical),
    ] {
        let image = counting(4, 7, 12, 3, InterleaveMode::Sample);
        assert_eq!(apply_all(&image, &[request, request]), image, "{request:?}");
    }
}

#[test]
fn transverse_is_rotated_transpose() {
    let image = counting(4, 3, 8, 1, InterleaveMode::None);
    let direct = TransformRequest::Transverse.apply(&image).unwrap();
    let composed = apply_all(
        &image,
        &[
            TransformRequest::Transpose,
            TransformRequest::Rotate(Rotation::Deg180),
        ],
    );
    assert_eq!(direct, composed);
}

#[test]
fn planar_input_stays_planar() {
    let planar = counting(3, 2, 8, 3, InterleaveMode::None);
    let interleaved = planar.clone().into_interleave(InterleaveMode::Sample).unwrap();

    let from_planar = TransformRequest::Rotate(Rotation::Deg90).apply(&planar).unwrap();
    let from_interleaved = TransformRequest::Rotate(Rotation::Deg90)
        .apply(&interleaved)
        .unwrap();
    assert_eq!(from_planar.info.interleave_mode, InterleaveMode::None);
    assert_eq!(
        from_planar.pixels_in(InterleaveMode::Sample).unwrap(),
        from_interleaved.pixels()
    );
}

#[test]
fn crop_and_wipe_partition_the_image() {
    let image = gray8(4, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    let region = TransformRequest::parse_region("2x2+1+1").unwrap();
    assert_eq!(region, Region::new(1, 1, 2, 2));

    let cropped = TransformRequest::Crop(region).apply(&image).unwrap();
    assert_eq!(cropped.pixels(), &[6, 7, 10, 11]);
    assert_eq!((cropped.frame().width, cropped.frame().height), (2, 2));

    let wiped = TransformRequest::Wipe(region).apply(&image).unwrap();
    assert_eq!(wiped.pixels(), &[1, 2, 3, 4, 5, 0, 0, 8, 9, 0, 0, 12]);
    assert_eq!(wiped.frame(), image.frame());
}

#[test]
fn regions_outside_the_frame_are_rejected() {
    let image = gray8(4, 3, &[0; 12]);
    for region in [Region::new(3, 0, 2, 1), Region::new(0, 0, 0, 1), Region::new(0, 2, 4, 2)] {
        let err = TransformRequest::Crop(region).apply(&image).unwrap_err();
        assert!(matches!(err, JlstError::InvalidRegion { .. }), "{region:?}");
        assert!(TransformRequest::Wipe(region).apply(&image).is_err());
    }
}

#[test]
fn padded_rows_are_repacked() {
    let image = Image {
        info: ImageInfo::new(FrameInfo::new(2, 2, 8, 1), InterleaveMode::None),
        data: ImageData {
            stride: 4,
            pixels: vec![1, 2, 0, 0, 3, 4, 0, 0],
        },
    };
    let flipped = TransformRequest::Flip(Flip::Vertical).apply(&image).unwrap();
    assert_eq!(flipped.pixels(), &[3, 4, 1, 2]);
    assert_eq!(flipped.data.stride, 0);
}

#[test]
fn layout_roundtrip_16bit() {
    let image = counting(3, 2, 16, 3, InterleaveMode::Sample);
    let planar = triplet_to_planar(image.pixels(), 3, 2, 16, 0).unwrap();
    assert_eq!(planar.len(), image.pixels().len());
    // first plane holds samples 1, 4, 7, ...
    assert_eq!(&planar[..4], &[1, 0, 4, 0]);
    let back = planar_to_triplet(&planar, 3, 2, 16, 0).unwrap();
    assert_eq!(back, image.pixels());
}

#[test]
fn rotation_from_degrees() {
    assert_eq!(Rotation::from_degrees(270).unwrap(), Rotation::Deg270);
    assert_eq!(Rotation::Deg90.degrees(), 90);
    assert!(Rotation::from_degrees(45).is_err());
}

#[test]
fn truncated_buffers_are_rejected() {
    let mut image = counting(4, 4, 8, 1, InterleaveMode::None);
    image.data.pixels.truncate(3);
    let err = TransformRequest::Transpose.apply(&image).unwrap_err();
    assert!(matches!(
        err,
        JlstError::BufferTooSmall {
            needed: 16,
            actual: 3
        }
    ));

    let short_stride = Image {
        info: ImageInfo::new(FrameInfo::new(2, 2, 8, 1), InterleaveMode::None),
        data: ImageData {
            stride: 1,
            pixels: vec![1, 2, 3, 4],
        },
    };
    let err = TransformRequest::Flip(Flip::Vertical).apply(&short_stride).unwrap_err();
    assert!(matches!(err, JlstError::UnsupportedGeometry(_)));
}
