use std::collections::HashSet;
use std::io::Read;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::assets::media::is_tool_on_path;
use crate::effects::composite::flatten_over_background;
use crate::encode::format::{OutputFormat, parse_encoders, select_format};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::render::frame::FrameRGBA;

/// List the encoders compiled into the system `ffmpeg`.
pub fn probe_encoders() -> AftermovieResult<HashSet<String>> {
    let out = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            AftermovieError::encoder_unavailable(format!("ffmpeg was not found on PATH: {e}"))
        })?;
    if !out.status.success() {
        return Err(AftermovieError::encoder_unavailable(format!(
            "`ffmpeg -encoders` exited with {}",
            out.status
        )));
    }
    Ok(parse_encoders(&String::from_utf8_lossy(&out.stdout)))
}

/// Sink streaming raw frames into the system `ffmpeg` and collecting the container from stdout.
///
/// The container is written fragmented so it can be produced on a pipe.
#[derive(Default)]
pub struct FfmpegSink {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create an idle sink; `ffmpeg` is spawned by `begin`.
    pub fn new() -> Self {
        Self::default()
    }

    fn command(cfg: &SinkConfig, format: OutputFormat) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        let audio = cfg.audio.as_ref().zip(format.audio_codec);
        if let Some((audio, _)) = audio {
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path);
        }

        // yuv420p needs even dimensions; odd canvases grow by one background-coloured row/column.
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            let [r, g, b, _] = cfg.background;
            cmd.args([
                "-vf",
                &format!("pad=ceil(iw/2)*2:ceil(ih/2)*2:color=0x{r:02x}{g:02x}{b:02x}"),
            ]);
        }

        cmd.args([
            "-c:v",
            format.video_codec,
            "-b:v",
            &cfg.bitrate.to_string(),
            "-pix_fmt",
            "yuv420p",
        ]);
        match audio {
            Some((_, codec)) => {
                cmd.args(["-c:a", codec, "-shortest"]);
            }
            None => {
                cmd.arg("-an");
            }
        }

        if format.container == "mp4" {
            cmd.args([
                "-movflags",
                "frag_keyframe+empty_moov+default_base_moof",
            ]);
        }
        cmd.args(["-f", format.container, "pipe:1"]);
        cmd
    }

    fn reap(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        for handle in [self.stdout_drain.take(), self.stderr_drain.take()]
            .into_iter()
            .flatten()
        {
            let _ = handle.join();
        }
        self.cfg = None;
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> AftermovieResult<OutputFormat> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(AftermovieError::invalid_input("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(AftermovieError::invalid_input("ffmpeg sink width/height must be non-zero"));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && (audio.sample_rate == 0 || audio.channels == 0)
        {
            return Err(AftermovieError::invalid_input(
                "audio sample_rate and channels must be non-zero",
            ));
        }

        if !is_tool_on_path("ffmpeg") {
            return Err(AftermovieError::encoder_unavailable(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }
        let available = probe_encoders()?;
        let format = select_format(cfg.container.as_deref(), &available, cfg.audio.is_some())?;
        tracing::info!(
            container = format.container,
            video = format.video_codec,
            audio = ?format.audio_codec.filter(|_| cfg.audio.is_some()),
            "encoder selected"
        );

        let mut child = Self::command(&cfg, format).spawn().map_err(|e| {
            AftermovieError::encoder_unavailable(format!("failed to spawn ffmpeg: {e}"))
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (Some(stdin), Some(mut stdout), Some(mut stderr)) = (stdin, stdout, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AftermovieError::encoding("failed to open ffmpeg pipes"));
        };
        let stdout_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stdout.read_to_end(&mut bytes)?;
            Ok(bytes)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(format)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> AftermovieResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| AftermovieError::encoding("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(AftermovieError::encoding("ffmpeg sink received out-of-order frame index"));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(AftermovieError::encoding(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        flatten_over_background(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            cfg.background,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AftermovieError::encoding("ffmpeg sink is already finalized"));
        };
        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            AftermovieError::encoding(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> AftermovieResult<Vec<u8>> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| AftermovieError::encoding("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| AftermovieError::encoding(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = join_drain(self.stderr_drain.take(), "stderr")?;
        let stdout_bytes = join_drain(self.stdout_drain.take(), "stdout")?;
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(AftermovieError::encoding(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        if stdout_bytes.is_empty() {
            return Err(AftermovieError::encoding("ffmpeg produced no output"));
        }
        tracing::debug!(bytes = stdout_bytes.len(), "ffmpeg finished");
        Ok(stdout_bytes)
    }

    fn abort(&mut self) {
        if self.child.is_some() {
            tracing::debug!("aborting ffmpeg");
        }
        self.reap();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.reap();
    }
}

fn join_drain(
    handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    name: &str,
) -> AftermovieResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| AftermovieError::encoding(format!("ffmpeg {name} drain thread panicked")))?
            .map_err(|e| AftermovieError::encoding(format!("ffmpeg {name} read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // rawvideo needs the rate before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
