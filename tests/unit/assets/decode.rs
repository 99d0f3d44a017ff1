use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage_and_empty() {
    assert!(matches!(decode_image(b""), Err(GearError::Decode(_))));
    assert!(matches!(
        decode_image(b"definitely not an image"),
        Err(GearError::Decode(_))
    ));
}

#[test]
fn decode_image_rejects_sides_the_renderer_cannot_address() {
    let wide = png_bytes(MAX_RASTER_DIM + 1, 2, [0, 0, 0, 255]);
    assert!(matches!(decode_image(&wide), Err(GearError::Decode(_))));
    assert!(matches!(decode_graphic(&wide), Err(GearError::Decode(_))));
}

#[test]
fn decode_svg_parse_ok_and_err() {
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="10"></svg>"#;
    let svg = parse_svg(ok).unwrap();
    assert_eq!(svg.size(), Size::new(30.0, 10.0));

    let bad = br#"<svg"#;
    assert!(parse_svg(bad).is_err());
}

#[test]
fn decode_graphic_sniffs_svg_and_raster() {
    let svg = br#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2"></svg>"#;
    match decode_graphic(svg).unwrap() {
        PreparedGraphic::Svg(s) => assert_eq!(s.size(), Size::new(4.0, 2.0)),
        PreparedGraphic::Raster(_) => panic!("expected svg"),
    }

    let commented = br#"<!-- made by hand -->
<svg xmlns="http://www.w3.org/2000/svg" width="6" height="3"></svg>"#;
    assert!(matches!(
        decode_graphic(commented).unwrap(),
        PreparedGraphic::Svg(_)
    ));

    let doctype = br#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN"
  "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" width="6" height="3"></svg>"#;
    assert!(matches!(
        decode_graphic(doctype).unwrap(),
        PreparedGraphic::Svg(_)
    ));

    let mut long_prolog = br#"<?xml version="1.0" encoding="UTF-8"?>"#.to_vec();
    long_prolog.extend(format!("<!-- {} -->", "x".repeat(400)).into_bytes());
    long_prolog.extend_from_slice(
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="6" height="3"></svg>"#,
    );
    assert!(matches!(
        decode_graphic(&long_prolog).unwrap(),
        PreparedGraphic::Svg(_)
    ));

    assert!(matches!(
        decode_graphic(b"neither raster nor markup"),
        Err(GearError::Decode(_))
    ));

    let png = png_bytes(3, 5, [0, 0, 0, 255]);
    let g = decode_graphic(&png).unwrap();
    assert!(matches!(g, PreparedGraphic::Raster(_)));
    assert_eq!(g.natural_size(), Size::new(3.0, 5.0));
}

#[test]
fn data_url_payload_is_extracted() {
    let png = png_bytes(2, 2, [1, 2, 3, 255]);
    let url = encode_data_url("image/png", &png);
    assert!(url.starts_with("data:image/png;base64,"));
    assert_eq!(decode_data_url(&url).unwrap(), png);

    assert!(decode_data_url("image/png;base64,AAAA").is_err());
    assert!(decode_data_url("data:image/png;base64").is_err());
    assert!(decode_data_url("data:text/plain,hello").is_err());
    assert!(decode_data_url("data:image/png;base64,***").is_err());
}
