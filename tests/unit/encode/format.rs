use super::*;

fn encoders(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn preference_strings_match_formats() {
    assert!(OutputFormat::MP4_H264.matches("mp4"));
    assert!(OutputFormat::MP4_H264.matches("video/mp4;codecs=avc1.42E01E"));
    assert!(OutputFormat::WEBM_VP9.matches("video/webm;codecs=vp9"));
    assert!(OutputFormat::WEBM_VP9.matches(" VP9 "));
    assert!(!OutputFormat::WEBM_VP8.matches("video/webm;codecs=vp9"));
    assert!(OutputFormat::WEBM_VP8.matches("video/webm; codecs=\"vp8,vorbis\""));
    assert!(!OutputFormat::MP4_H264.matches("webm"));
}

#[test]
fn default_order_prefers_h264() {
    let all = encoders(&["libx264", "aac", "libvpx-vp9", "libopus"]);
    assert_eq!(select_format(None, &all, true).unwrap(), OutputFormat::MP4_H264);
}

#[test]
fn preference_wins_when_available() {
    let all = encoders(&["libx264", "aac", "libvpx-vp9", "libopus"]);
    assert_eq!(
        select_format(Some("webm"), &all, true).unwrap(),
        OutputFormat::WEBM_VP9
    );
}

#[test]
fn unavailable_preference_falls_back() {
    let only_vp8 = encoders(&["libvpx", "libvorbis"]);
    assert_eq!(
        select_format(Some("mp4"), &only_vp8, true).unwrap(),
        OutputFormat::WEBM_VP8
    );
}

#[test]
fn audio_encoder_is_required_only_with_audio() {
    let no_audio = encoders(&["libx264"]);
    assert_eq!(
        select_format(None, &no_audio, false).unwrap(),
        OutputFormat::MP4_H264
    );
    let err = select_format(None, &no_audio, true).unwrap_err();
    assert!(matches!(err, AftermovieError::EncoderUnavailable(_)));
}

#[test]
fn nothing_available_is_encoder_unavailable() {
    let err = select_format(Some("mp4"), &HashSet::new(), false).unwrap_err();
    assert!(matches!(err, AftermovieError::EncoderUnavailable(_)));
}

#[test]
fn encoder_listing_is_parsed() {
    let text = "\
Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D mpeg4                MPEG-4 part 2
 A....D aac                  AAC (Advanced Audio Coding)
";
    let names = parse_encoders(text);
    assert_eq!(names, encoders(&["libx264", "mpeg4", "aac"]));
}
