use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    assert_eq!(over(dst, [200, 200, 200, 200], 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0], 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let src = [255, 0, 0, 255];
    assert_eq!(over([0, 0, 0, 255], src, 1.0), src);
}

#[test]
fn over_half_opacity_blends() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 255], 0.5);
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]));
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn flatten_premul_over_black_keeps_color() {
    let src = [100u8, 50, 0, 128];
    let mut dst = [0u8; 4];
    flatten_over_background(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, [100, 50, 0, 255]);
}

#[test]
fn flatten_transparent_shows_background() {
    let src = [0u8, 0, 0, 0];
    let mut dst = [0u8; 4];
    flatten_over_background(&mut dst, &src, true, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, [10, 20, 30, 255]);
}

#[test]
fn flatten_straight_alpha_premultiplies_first() {
    let src = [200u8, 100, 0, 128];
    let mut dst = [0u8; 4];
    flatten_over_background(&mut dst, &src, false, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, [100, 50, 0, 255]);
}
