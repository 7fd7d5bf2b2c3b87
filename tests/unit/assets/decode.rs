use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, px.repeat((w * h) as usize)).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);

    let decoded = decode_image(&buf, 4096).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.data(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_downscales_to_max_dimension() {
    let buf = png_bytes(40, 20, [10, 20, 30, 255]);
    let decoded = decode_image(&buf, 10).unwrap();
    assert_eq!((decoded.width, decoded.height), (10, 5));
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not an image", 4096).is_err());
}

#[test]
fn raw_constructors_validate_length() {
    assert!(DecodedImage::from_premul_rgba8(2, 2, &[0u8; 15]).is_err());
    assert!(DecodedImage::from_premul_rgba8(0, 2, &[]).is_err());
    let solid = DecodedImage::solid(3, 2, [1, 2, 3, 255]).unwrap();
    assert_eq!(solid.data().len(), 24);
    assert_eq!(&solid.data()[20..24], &[1, 2, 3, 255]);
}

#[test]
fn decode_svg_parse_ok_and_err() {
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
    parse_svg(ok).unwrap();

    let bad = br#"<svg"#;
    assert!(parse_svg(bad).is_err());
}
