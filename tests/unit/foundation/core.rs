use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn ms_to_frames_rounds_half_up() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.ms_to_frames(3000), 90);
    assert_eq!(fps.ms_to_frames(2500), 75);
    // 1 frame = 33.33 ms; 16.67 ms rounds up to one frame.
    assert_eq!(fps.ms_to_frames(17), 1);
    assert_eq!(fps.ms_to_frames(16), 0);
}

#[test]
fn frames_to_secs_matches_rate() {
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frames_to_secs(240) - 8.0).abs() < 1e-9);
}

#[test]
fn canvas_center_and_len() {
    let c = Canvas {
        width: 64,
        height: 36,
    };
    assert_eq!(c.center(), Point::new(32.0, 18.0));
    assert_eq!(c.rgba_len(), 64 * 36 * 4);
}

#[test]
fn premultiply_straight_rgba() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
}
