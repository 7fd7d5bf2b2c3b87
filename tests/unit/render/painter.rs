use super::*;
use crate::effects::transitions::TransitionKind;

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 36,
};
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn painter() -> Painter {
    Painter::new(CANVAS, [0, 0, 0, 255], None).unwrap()
}

fn solid(rgba: [u8; 4]) -> DecodedImage {
    DecodedImage::solid(CANVAS.width, CANVAS.height, rgba).unwrap()
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    frame.pixel(x, y).unwrap()
}

fn assert_close(actual: [u8; 4], expected: [u8; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(a.abs_diff(e) <= 3, "{actual:?} != {expected:?}");
    }
}

#[test]
fn foreground_is_contained_and_backdrop_covers() {
    let still = KenBurnsParams::still();
    let fg = foreground_transform(200.0, 100.0, 100.0, 100.0, &still, 0.0);
    let r = fg.transform_rect_bbox(Rect::new(0.0, 0.0, 200.0, 100.0));
    assert!((r.width() - 90.0).abs() < 1e-9);
    assert!((r.x0 - 5.0).abs() < 1e-9);

    let zooming = KenBurnsParams {
        start_scale: 1.15,
        end_scale: 1.0,
        pan_x: 1.0,
        pan_y: -1.0,
    };
    for t in [0.0, 0.3, 0.7, 1.0] {
        let bg = backdrop_transform(200.0, 100.0, 100.0, 100.0, &zooming, t);
        let r = bg.transform_rect_bbox(Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!(r.x0 <= 0.0 && r.y0 <= 0.0 && r.x1 >= 100.0 && r.y1 >= 100.0, "t={t}: {r:?}");
    }
}

#[test]
fn item_layer_fills_the_canvas_with_the_photo_in_the_middle() {
    let mut p = painter();
    let photo = DecodedImage::solid(40, 20, RED).unwrap();
    let layer = p.item_layer(&photo, &KenBurnsParams::still(), 0.0).unwrap();
    assert_eq!((layer.width, layer.height), (CANVAS.width, CANVAS.height));
    assert!(layer.data().chunks_exact(4).all(|px| px[3] == 255));
    let mid = ((18 * CANVAS.width + 32) * 4) as usize;
    let d = layer.data();
    assert_close([d[mid], d[mid + 1], d[mid + 2], d[mid + 3]], RED);
}

#[test]
fn invisible_layers_do_not_change_the_frame() {
    let mut p = painter();
    let a = solid(RED);
    let b = solid(BLUE);
    let start = TransitionKind::Fade.frame(0.0, 64.0, 36.0);
    let with_next = p
        .compose(&[(&a, start.current), (&b, start.next)], None)
        .unwrap();
    let alone = p.compose(&[(&a, LayerPose::identity())], None).unwrap();
    assert_eq!(with_next, alone);
    assert_close(px(&alone, 10, 10), RED);
}

#[test]
fn finished_transition_shows_only_the_next_layer() {
    let mut p = painter();
    let a = solid(RED);
    let b = solid(BLUE);
    for kind in [TransitionKind::SlideLeft, TransitionKind::ZoomIn, TransitionKind::Fade] {
        let end = kind.frame(1.0, 64.0, 36.0);
        let frame = p.compose(&[(&a, end.current), (&b, end.next)], None).unwrap();
        assert_close(px(&frame, 32, 18), BLUE);
        assert_close(px(&frame, 1, 1), BLUE);
    }
}

#[test]
fn wipe_splits_the_frame() {
    let mut p = painter();
    let a = solid(RED);
    let b = solid(BLUE);
    let mid = TransitionKind::WipeLeft.frame(0.5, 64.0, 36.0);
    let frame = p.compose(&[(&a, mid.current), (&b, mid.next)], None).unwrap();
    assert_close(px(&frame, 2, 18), RED);
    assert_close(px(&frame, 61, 18), BLUE);
}

#[test]
fn blurred_and_pixelated_solid_layers_stay_solid() {
    let mut p = painter();
    let a = solid(RED);
    let pose = LayerPose {
        blur_radius: 8.0,
        pixel_block: 4,
        ..LayerPose::identity()
    };
    let frame = p.compose(&[(&a, pose)], None).unwrap();
    assert_close(px(&frame, 32, 18), RED);
}

#[test]
fn decorative_frame_is_drawn_last() {
    let mut p = painter();
    p.set_frame_overlay(DecodedImage::solid(2, 2, [0, 255, 0, 255]).unwrap())
        .unwrap();
    let a = solid(RED);
    let frame = p.compose(&[(&a, LayerPose::identity())], None).unwrap();
    assert_close(px(&frame, 5, 5), [0, 255, 0, 255]);
    let card = p
        .title_card(
            &TitleCard {
                title: "Hello",
                subtitle: None,
            },
            0.5,
        )
        .unwrap();
    assert_close(px(&card, 60, 30), [0, 255, 0, 255]);
}

#[test]
fn title_card_without_font_is_still_opaque() {
    let mut p = painter();
    assert!(p.text.is_none());
    let card = p
        .title_card(
            &TitleCard {
                title: "Party",
                subtitle: Some("2026"),
            },
            0.4,
        )
        .unwrap();
    assert_eq!(card.data.len(), CANVAS.rgba_len());
    assert!(card.data.chunks_exact(4).all(|px| px[3] == 255));
}
