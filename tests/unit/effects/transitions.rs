use super::*;

const W: f64 = 320.0;
const H: f64 = 180.0;

#[test]
fn every_kind_starts_as_current_alone() {
    for kind in TransitionKind::ALL {
        let f = kind.frame(0.0, W, H);
        assert!(f.current.is_identity(), "{kind:?} current at t=0: {:?}", f.current);
        assert!(f.next.is_invisible(W, H), "{kind:?} next at t=0: {:?}", f.next);
    }
}

#[test]
fn every_kind_ends_as_next_alone() {
    for kind in TransitionKind::ALL {
        let f = kind.frame(1.0, W, H);
        assert!(f.next.is_identity(), "{kind:?} next at t=1: {:?}", f.next);
    }
}

#[test]
fn names_round_trip_through_from_name_and_serde() {
    for kind in TransitionKind::ALL {
        assert_eq!(TransitionKind::from_name(kind.name()), Some(kind));
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.name()));
    }
    assert_eq!(
        TransitionKind::from_name(" Slide_Left "),
        Some(TransitionKind::SlideLeft)
    );
    assert_eq!(TransitionKind::from_name("spiral"), None);
}

#[test]
fn slides_move_both_layers_the_same_way() {
    let f = TransitionKind::SlideLeft.frame(0.5, W, H);
    let cur = f.current.transform.translation();
    let next = f.next.transform.translation();
    assert!((cur.x + W * 0.5).abs() < 1e-9);
    assert!((next.x - W * 0.5).abs() < 1e-9);

    let f = TransitionKind::SlideDown.frame(0.5, W, H);
    assert!((f.next.transform.translation().y + H * 0.5).abs() < 1e-9);
}

#[test]
fn wipes_reveal_from_the_matching_edge() {
    let left = TransitionKind::WipeLeft.frame(0.5, W, H).next.clip.unwrap();
    assert!((left.x0 - W * 0.5).abs() < 1e-9 && left.x1 == W);
    let right = TransitionKind::WipeRight.frame(0.5, W, H).next.clip.unwrap();
    assert!(right.x0 == 0.0 && (right.x1 - W * 0.5).abs() < 1e-9);
}

#[test]
fn blur_peaks_in_the_middle() {
    let mid = TransitionKind::Blur.frame(0.5, W, H);
    let early = TransitionKind::Blur.frame(0.2, W, H);
    assert!(mid.current.blur_radius > early.current.blur_radius);
    assert!((f64::from(mid.current.blur_radius) - max_blur_radius(W)).abs() < 1e-3);
    assert_eq!(mid.current.blur_radius, mid.next.blur_radius);
}

#[test]
fn pixelate_blocks_move_in_opposite_directions() {
    let max = max_pixel_block(W);
    let early = TransitionKind::Pixelate.frame(0.1, W, H);
    let late = TransitionKind::Pixelate.frame(0.9, W, H);
    assert!(early.current.pixel_block < late.current.pixel_block);
    assert!(early.next.pixel_block > late.next.pixel_block);
    assert!(early.next.pixel_block <= max);
}

#[test]
fn fade_keeps_current_opaque_while_cross_fade_dims_it() {
    let fade = TransitionKind::Fade.frame(0.5, W, H);
    let cross = TransitionKind::CrossFade.frame(0.5, W, H);
    assert_eq!(fade.current.opacity, 1.0);
    assert!(cross.current.opacity < 1.0);
    assert!((fade.next.opacity - 0.5).abs() < 1e-6);
}
