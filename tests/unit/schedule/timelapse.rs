use super::*;

#[test]
fn playback_rate_is_always_clamped() {
    for clip in [0.01, 0.5, 1.0, 3.0, 10.0, 60.0, 3600.0] {
        for slot in [0.1, 1.0, 3.0, 4.0, 30.0] {
            let r = playback_rate(Some(clip), slot);
            assert!((MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&r), "{clip}/{slot} -> {r}");
        }
    }
    assert_eq!(playback_rate(Some(12.0), 4.0), 3.0);
}

#[test]
fn unknown_clip_duration_plays_at_normal_speed() {
    assert_eq!(playback_rate(None, 4.0), 1.0);
    assert_eq!(playback_rate(Some(f64::NAN), 4.0), 1.0);
    assert_eq!(effective_clip_secs(None, 4.0), 4.0);
    assert_eq!(playback_rate(Some(2.0), 0.0), 1.0);
}

#[test]
fn position_wraps_modulo_clip_length() {
    assert!((timelapse_position(30, 30.0, 2.0, 10.0) - 2.0).abs() < 1e-12);
    assert!((timelapse_position(180, 30.0, 2.0, 10.0) - 2.0).abs() < 1e-9);
    let p = timelapse_position(1000, 30.0, 5.0, 3.0);
    assert!((0.0..3.0).contains(&p));
}
