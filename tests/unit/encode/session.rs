use std::sync::Mutex;

use super::*;
use crate::foundation::core::{Canvas, Fps};

#[derive(Default)]
struct Log {
    frames: Vec<u64>,
    ended: bool,
    aborted: bool,
}

struct Recording {
    log: Arc<Mutex<Log>>,
    fail_at: Option<u64>,
}

impl FrameSink for Recording {
    fn begin(&mut self, _cfg: SinkConfig) -> AftermovieResult<OutputFormat> {
        Ok(OutputFormat::RAW_RGBA)
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> AftermovieResult<()> {
        if self.fail_at == Some(idx.0) {
            return Err(AftermovieError::encoding("boom"));
        }
        self.log.lock().unwrap().frames.push(idx.0);
        Ok(())
    }

    fn end(&mut self) -> AftermovieResult<Vec<u8>> {
        self.log.lock().unwrap().ended = true;
        Ok(vec![42])
    }

    fn abort(&mut self) {
        self.log.lock().unwrap().aborted = true;
    }
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
        audio: None,
        bitrate: 1,
        background: [0, 0, 0, 255],
        container: None,
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA::solid(
        Canvas {
            width: 2,
            height: 2,
        },
        [0, 0, 0, 255],
    )
}

fn start(fail_at: Option<u64>) -> (EncoderSession, Arc<Mutex<Log>>) {
    let log = Arc::new(Mutex::new(Log::default()));
    let sink = Recording {
        log: log.clone(),
        fail_at,
    };
    (EncoderSession::start(Box::new(sink), cfg()).unwrap(), log)
}

#[test]
fn frames_arrive_in_order_and_finish_returns_payload() {
    let (mut session, log) = start(None);
    for _ in 0..10 {
        session.submit(frame()).unwrap();
    }
    assert_eq!(session.submitted(), 10);
    assert_eq!(session.finish().unwrap(), vec![42]);
    let log = log.lock().unwrap();
    assert_eq!(log.frames, (0..10).collect::<Vec<_>>());
    assert!(log.ended);
    assert!(!log.aborted);
}

#[test]
fn dropping_an_unfinished_session_aborts_the_sink() {
    let (mut session, log) = start(None);
    session.submit(frame()).unwrap();
    drop(session);
    let log = log.lock().unwrap();
    assert!(log.aborted);
    assert!(!log.ended);
}

#[test]
fn sink_errors_surface_on_submit_or_finish() {
    let (mut session, log) = start(Some(1));
    let mut first_err = None;
    for _ in 0..20 {
        if let Err(e) = session.submit(frame()) {
            first_err = Some(e);
            break;
        }
    }
    let err = match first_err {
        Some(e) => e,
        None => session.finish().unwrap_err(),
    };
    assert!(matches!(err, AftermovieError::Encoding(_)));
    assert!(log.lock().unwrap().aborted);
}
