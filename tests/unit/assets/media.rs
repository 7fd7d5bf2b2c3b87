use super::*;

#[test]
fn fit_within_keeps_small_sources_and_evens_sides() {
    assert_eq!(fit_within(640, 360, 4096), (640, 360));
    assert_eq!(fit_within(641, 361, 4096), (640, 360));
}

#[test]
fn fit_within_scales_down_large_sources() {
    assert_eq!(fit_within(3840, 2160, 1920), (1920, 1080));
    assert_eq!(fit_within(1080, 1920, 960), (540, 960));
}

#[test]
fn f32le_decoding_checks_alignment() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0.5f32.to_le_bytes());
    bytes.extend_from_slice(&(-1.0f32).to_le_bytes());
    assert_eq!(f32le_to_samples(&bytes).unwrap(), vec![0.5, -1.0]);
    assert!(f32le_to_samples(&bytes[..5]).is_err());
}

#[test]
fn pcm_frames_count_per_channel() {
    let pcm = AudioPcm {
        sample_rate: 4,
        channels: 2,
        interleaved_f32: vec![0.0; 8],
    };
    assert_eq!(pcm.frames(), 4);
}

#[test]
fn probing_a_missing_file_is_a_media_load_error() {
    if !is_tool_on_path("ffprobe") {
        return;
    }
    let err = probe_video(Path::new("/definitely/missing/clip.mp4")).unwrap_err();
    assert!(matches!(err, AftermovieError::MediaLoad { .. }));
}
