use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::thread::JoinHandle;

use crate::encode::format::OutputFormat;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::render::frame::FrameRGBA;

/// Frames buffered between the render loop and the encoder thread.
const QUEUE_DEPTH: usize = 4;

/// A [`FrameSink`] driven from its own thread.
///
/// Dropping an unfinished session aborts the sink.
pub(crate) struct EncoderSession {
    tx: Option<SyncSender<(FrameIndex, FrameRGBA)>>,
    worker: Option<JoinHandle<AftermovieResult<Vec<u8>>>>,
    abort: Arc<AtomicBool>,
    format: OutputFormat,
    submitted: u64,
}

impl EncoderSession {
    pub(crate) fn start(mut sink: Box<dyn FrameSink>, cfg: SinkConfig) -> AftermovieResult<Self> {
        let format = match sink.begin(cfg) {
            Ok(format) => format,
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::sync_channel::<(FrameIndex, FrameRGBA)>(QUEUE_DEPTH);
        let abort = Arc::new(AtomicBool::new(false));
        let worker_abort = abort.clone();
        let worker = std::thread::Builder::new()
            .name("aftermovie-encoder".to_string())
            .spawn(move || {
                for (idx, frame) in rx {
                    if worker_abort.load(Ordering::Relaxed) {
                        break;
                    }
                    if let Err(e) = sink.push_frame(idx, &frame) {
                        sink.abort();
                        return Err(e);
                    }
                }
                if worker_abort.load(Ordering::Relaxed) {
                    sink.abort();
                    return Err(AftermovieError::Cancelled);
                }
                let out = sink.end();
                if out.is_err() {
                    sink.abort();
                }
                out
            })
            .map_err(|e| anyhow::anyhow!("failed to spawn encoder thread: {e}"))?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            abort,
            format,
            submitted: 0,
        })
    }

    pub(crate) fn format(&self) -> OutputFormat {
        self.format
    }

    pub(crate) fn submitted(&self) -> u64 {
        self.submitted
    }

    /// Queue the next frame, blocking while the encoder is behind.
    pub(crate) fn submit(&mut self, frame: FrameRGBA) -> AftermovieResult<()> {
        let idx = FrameIndex(self.submitted);
        let sent = match self.tx.as_ref() {
            Some(tx) => tx.send((idx, frame)).is_ok(),
            None => false,
        };
        if !sent {
            self.tx = None;
            return Err(match self.join() {
                Err(e) => e,
                Ok(_) => AftermovieError::encoding("encoder stopped accepting frames"),
            });
        }
        self.submitted += 1;
        Ok(())
    }

    /// Close the stream and wait for the encoded payload.
    pub(crate) fn finish(mut self) -> AftermovieResult<Vec<u8>> {
        self.tx = None;
        self.join()
    }

    fn join(&mut self) -> AftermovieResult<Vec<u8>> {
        let worker = self
            .worker
            .take()
            .ok_or_else(|| AftermovieError::encoding("encoder already finished"))?;
        worker
            .join()
            .map_err(|_| AftermovieError::encoding("encoder thread panicked"))?
    }
}

impl Drop for EncoderSession {
    fn drop(&mut self) {
        if self.worker.is_none() {
            return;
        }
        self.abort.store(true, Ordering::Relaxed);
        self.tx = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("encoder thread panicked during abort");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/session.rs"]
mod tests;
