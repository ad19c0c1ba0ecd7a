use std::sync::Arc;

use super::*;
use crate::assets::decode::decode_image;

#[test]
fn composite_file_has_fixed_name_and_mime() {
    let frame = FrameRGBA {
        width: 3,
        height: 2,
        data: vec![255; 3 * 2 * 4],
        premultiplied: true,
    };
    let file = ExportFile::composite(&frame).unwrap();
    assert_eq!(file.file_name, "text-behind-image.png");
    assert_eq!(file.mime, "image/png");
    assert_eq!((file.width, file.height), (3, 2));
    assert!(file.bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn png_round_trips_dimensions_and_opaque_pixels() {
    let data = vec![
        255, 0, 0, 255, //
        0, 255, 0, 255, //
        0, 0, 255, 255, //
        12, 34, 56, 255,
    ];
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: data.clone(),
        premultiplied: true,
    };
    let decoded = decode_image(&encode_png(&frame).unwrap()).unwrap();
    assert_eq!((decoded.width, decoded.height), (2, 2));
    assert_eq!(decoded.rgba8_premul.as_slice(), data.as_slice());
}

#[test]
fn premultiplied_pixels_are_written_straight() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    let png = encode_png(&frame).unwrap();
    let straight = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(straight.get_pixel(0, 0).0, [128, 0, 0, 128]);
}

#[test]
fn mismatched_buffer_is_an_encode_error() {
    let frame = FrameRGBA {
        width: 4,
        height: 4,
        data: vec![0; 3],
        premultiplied: true,
    };
    assert!(matches!(
        encode_png(&frame).unwrap_err(),
        TextBehindError::Encode(_)
    ));
}

#[test]
fn prepared_images_encode_too() {
    let img = PreparedImage {
        width: 1,
        height: 1,
        rgba8_premul: Arc::new(vec![0, 0, 0, 0]),
    };
    let png = encode_prepared_png(&img).unwrap();
    assert_eq!(decode_image(&png).unwrap().width, 1);
}
