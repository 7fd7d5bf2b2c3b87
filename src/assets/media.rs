use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::error::{AftermovieError, AftermovieResult};

/// Sample rate of the soundtrack handed to the encoder.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Basic metadata about a source video file.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Source path used for probing/decoding.
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container duration, when ffprobe reports one.
    pub duration_secs: Option<f64>,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

/// Decoded interleaved floating-point PCM.
#[derive(Clone, Debug)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.interleaved_f32.len() / usize::from(self.channels.max(1))
    }
}

/// Return `true` when `tool -version` runs successfully.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Probe source video metadata through `ffprobe`.
#[tracing::instrument(level = "debug")]
pub fn probe_video(source_path: &Path) -> AftermovieResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let url = source_path.display().to_string();
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| AftermovieError::media_load(&url, format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(AftermovieError::media_load(
            &url,
            format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout).map_err(|e| {
        AftermovieError::media_load(&url, format!("ffprobe json parse failed: {e}"))
    })?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| AftermovieError::media_load(&url, "no video stream found"))?;
    let (Some(width), Some(height)) = (video_stream.width, video_stream.height) else {
        return Err(AftermovieError::media_load(&url, "missing video dimensions from ffprobe"));
    };
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| parse_duration(f.duration.as_deref()))
        .or_else(|| parse_duration(video_stream.duration.as_deref()));
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_secs,
        has_audio,
    })
}

fn parse_duration(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Fit `(width, height)` inside `max_dim` keeping the aspect ratio, with even sides.
pub(crate) fn fit_within(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let max_dim = max_dim.max(2);
    let (w, h) = if width > max_dim || height > max_dim {
        let s = f64::from(max_dim) / f64::from(width.max(height));
        (
            (f64::from(width) * s).round() as u32,
            (f64::from(height) * s).round() as u32,
        )
    } else {
        (width, height)
    };
    ((w & !1).max(2), (h & !1).max(2))
}

/// Spawn-ready command decoding one RGBA frame at `time_secs`, scaled to `out_w x out_h`.
pub(crate) fn frame_decode_command(
    source: &VideoSourceInfo,
    time_secs: f64,
    out_w: u32,
    out_h: u32,
) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error", "-ss", &format!("{:.6}", time_secs.max(0.0))])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            "1",
            "-vf",
            &format!("scale={out_w}:{out_h}"),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

/// Decode audio from a media file to stereo interleaved `f32` PCM.
#[tracing::instrument(level = "debug")]
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> AftermovieResult<AudioPcm> {
    let url = path.display().to_string();
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            AftermovieError::media_load(&url, format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        // A file without audio streams decodes to silence.
        if msg.contains("Stream specifier")
            || msg.contains("matches no streams")
            || msg.contains("Output file #0 does not contain any stream")
        {
            return Ok(AudioPcm {
                sample_rate,
                channels: 2,
                interleaved_f32: Vec::new(),
            });
        }
        return Err(AftermovieError::media_load(
            &url,
            format!("ffmpeg audio decode failed: {}", msg.trim()),
        ));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: f32le_to_samples(&out.stdout)
            .map_err(|e| AftermovieError::media_load(&url, e))?,
    })
}

pub(crate) fn f32le_to_samples(bytes: &[u8]) -> Result<Vec<f32>, String> {
    if !bytes.len().is_multiple_of(4) {
        return Err("decoded audio byte length is not aligned to f32 samples".to_owned());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
