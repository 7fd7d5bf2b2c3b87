use std::path::PathBuf;

use crate::encode::format::OutputFormat;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::render::frame::FrameRGBA;

/// Configuration handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Soundtrack to mux, if any.
    pub audio: Option<AudioInputConfig>,
    /// Target video bitrate in bits per second.
    pub bitrate: u64,
    /// Straight-alpha colour used to flatten translucent pixels.
    pub background: [u8; 4],
    /// Preferred container/codec string from the render options.
    pub container: Option<String>,
}

/// Raw PCM audio input for sinks that mux a soundtrack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called with strictly increasing [`FrameIndex`] values. Exactly one of `end`
/// or `abort` closes the sink.
pub trait FrameSink: Send {
    /// Prepare for output and report the format that will be produced.
    fn begin(&mut self, cfg: SinkConfig) -> AftermovieResult<OutputFormat>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AftermovieResult<()>;
    /// Finalise and return the encoded payload.
    fn end(&mut self) -> AftermovieResult<Vec<u8>>;
    /// Drop any partial output and release resources.
    fn abort(&mut self);
}

/// Sink keeping raw frames in memory, for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    aborted: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `abort` was called.
    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> AftermovieResult<OutputFormat> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.aborted = false;
        Ok(OutputFormat::RAW_RGBA)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AftermovieResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| AftermovieError::encoding("in-memory sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(AftermovieError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if let Some((last, _)) = self.frames.last()
            && idx <= *last
        {
            return Err(AftermovieError::encoding("out-of-order frame index"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> AftermovieResult<Vec<u8>> {
        Ok(self
            .frames
            .iter()
            .flat_map(|(_, f)| f.data.iter().copied())
            .collect())
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.frames.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
