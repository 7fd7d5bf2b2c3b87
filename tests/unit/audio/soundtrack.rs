use super::*;
use crate::assets::media::is_tool_on_path;

#[test]
fn guard_removes_its_file() {
    let path = std::env::temp_dir().join(format!("aftermovie_guard_{}.bin", std::process::id()));
    std::fs::write(&path, b"x").unwrap();
    {
        let guard = TempFileGuard::new(path.clone());
        assert!(guard.path().exists());
    }
    assert!(!path.exists());
}

#[test]
fn cancelled_token_stops_before_decoding() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let err =
        Soundtrack::prepare(&AudioOptions::new("/missing/track.mp3"), 3.0, &cancel).unwrap_err();
    assert!(err.is_cancelled());
}

#[test]
fn missing_track_is_a_media_load_error() {
    if !is_tool_on_path("ffmpeg") {
        return;
    }
    let err = Soundtrack::prepare(
        &AudioOptions::new("/definitely/missing/track.mp3"),
        3.0,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::AftermovieError::MediaLoad { .. }
    ));
}
