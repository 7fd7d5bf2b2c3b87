use super::*;
use crate::assets::decode::parse_svg;

#[test]
fn svg_is_stretched_to_the_requested_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
    </svg>"##;
    let tree = parse_svg(svg).unwrap();
    let img = rasterize_svg(&tree, 32, 8).unwrap();
    assert_eq!((img.width, img.height), (32, 8));
    // Fully covered: every pixel opaque red.
    assert!(img.data().chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
}

#[test]
fn transparent_svg_regions_stay_transparent() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
        <rect x="0" y="0" width="5" height="10" fill="#ffffff"/>
    </svg>"##;
    let tree = parse_svg(svg).unwrap();
    let img = rasterize_svg(&tree, 10, 10).unwrap();
    let last = &img.data()[img.data().len() - 4..];
    assert_eq!(last[3], 0);
}

#[test]
fn rejects_empty_raster_size() {
    let tree = parse_svg(br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#)
        .unwrap();
    assert!(rasterize_svg(&tree, 0, 10).is_err());
}
