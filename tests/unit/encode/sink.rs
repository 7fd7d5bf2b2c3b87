use super::*;
use crate::foundation::core::Canvas;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
        bitrate: 1_000_000,
        background: [0, 0, 0, 255],
        container: None,
    }
}

fn frame(v: u8) -> FrameRGBA {
    FrameRGBA::solid(
        Canvas {
            width: 2,
            height: 2,
        },
        [v, v, v, 255],
    )
}

#[test]
fn payload_is_concatenated_frames() {
    let mut sink = InMemorySink::new();
    assert!(sink.config().is_none());
    assert_eq!(sink.begin(cfg(2, 2)).unwrap(), OutputFormat::RAW_RGBA);
    assert_eq!(sink.config().map(|c| c.width), Some(2));
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2)).unwrap();
    let payload = sink.end().unwrap();
    assert_eq!(payload.len(), 2 * 2 * 2 * 4);
    assert_eq!(payload[0], 1);
    assert_eq!(payload[16], 2);
    assert_eq!(sink.frames().len(), 2);
}

#[test]
fn rejects_mismatched_sizes_and_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(4, 4)).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &frame(1)).is_err());

    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(3), &frame(1)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(1)).is_err());
}

#[test]
fn abort_discards_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(1)).unwrap();
    sink.abort();
    assert!(sink.aborted());
    assert!(sink.frames().is_empty());
}
