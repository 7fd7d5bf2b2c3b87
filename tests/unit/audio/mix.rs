use super::*;

fn tone(secs: f64, value: f32) -> AudioPcm {
    let frames = (secs * 100.0) as usize;
    AudioPcm {
        sample_rate: 100,
        channels: 2,
        interleaved_f32: vec![value; frames * 2],
    }
}

#[test]
fn output_length_matches_the_video_exactly() {
    for (src, total, looped) in [(1.0, 3.0, false), (5.0, 3.0, false), (1.0, 3.5, true)] {
        let out = build_soundtrack(&tone(src, 0.5), total, 1.0, looped);
        assert_eq!(out.len(), (total * 100.0) as usize * 2);
    }
}

#[test]
fn short_track_is_padded_with_silence() {
    let out = build_soundtrack(&tone(1.0, 0.5), 3.0, 1.0, false);
    assert_eq!(out[0], 0.5);
    assert_eq!(out[199], 0.5);
    assert!(out[200..].iter().all(|s| *s == 0.0));
}

#[test]
fn looped_track_is_tiled() {
    let mut pcm = tone(1.0, 0.0);
    pcm.interleaved_f32[0] = 0.9;
    let out = build_soundtrack(&pcm, 3.0, 1.0, true);
    assert_eq!(out[0], 0.9);
    assert_eq!(out[200], 0.9);
    assert_eq!(out[400], 0.9);
    assert_eq!(out[2], 0.0);
}

#[test]
fn long_track_fades_out_over_the_last_two_seconds() {
    let out = build_soundtrack(&tone(10.0, 1.0), 5.0, 1.0, false);
    // Before the fade: full level.
    assert_eq!(out[2 * 299], 1.0);
    // Fade starts at 3 s.
    assert!((out[2 * 300] - 1.0).abs() < 1e-6);
    assert!((out[2 * 400] - 0.5).abs() < 1e-6);
    let last = out[out.len() - 2];
    assert!(last > 0.0 && last <= 0.01);
}

#[test]
fn looped_long_track_does_not_fade() {
    let out = build_soundtrack(&tone(10.0, 1.0), 5.0, 1.0, true);
    assert_eq!(out[out.len() - 1], 1.0);
}

#[test]
fn volume_is_applied_and_clamped() {
    let out = build_soundtrack(&tone(1.0, 0.8), 1.0, 0.5, false);
    assert!((out[0] - 0.4).abs() < 1e-6);

    let loud = build_soundtrack(&tone(1.0, 3.0), 1.0, 1.0, false);
    assert_eq!(loud[0], 1.0);
}

#[test]
fn empty_source_gives_silence() {
    let pcm = AudioPcm {
        sample_rate: 100,
        channels: 2,
        interleaved_f32: Vec::new(),
    };
    let out = build_soundtrack(&pcm, 2.0, 1.0, true);
    assert_eq!(out.len(), 400);
    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn f32le_file_round_trips_sample_bytes() {
    let path = std::env::temp_dir().join(format!("aftermovie_mix_{}.f32le", std::process::id()));
    write_mix_to_f32le_file(&[0.25, -0.5], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -0.5);
    std::fs::remove_file(&path).ok();
}
