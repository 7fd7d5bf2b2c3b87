use std::collections::HashSet;

use crate::foundation::error::{AftermovieError, AftermovieResult};

/// Container and codecs of an encoded video.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFormat {
    /// Container name as understood by `ffmpeg -f`.
    pub container: &'static str,
    /// `ffmpeg` video encoder.
    pub video_codec: &'static str,
    /// `ffmpeg` audio encoder, `None` for video-only formats.
    pub audio_codec: Option<&'static str>,
    /// Mime type of the payload.
    pub mime_type: &'static str,
    /// File extension without the dot.
    pub extension: &'static str,
}

impl OutputFormat {
    /// H.264 + AAC in fragmented MP4.
    pub const MP4_H264: Self = Self {
        container: "mp4",
        video_codec: "libx264",
        audio_codec: Some("aac"),
        mime_type: "video/mp4",
        extension: "mp4",
    };
    /// VP9 + Opus in WebM.
    pub const WEBM_VP9: Self = Self {
        container: "webm",
        video_codec: "libvpx-vp9",
        audio_codec: Some("libopus"),
        mime_type: "video/webm",
        extension: "webm",
    };
    /// VP8 + Vorbis in WebM.
    pub const WEBM_VP8: Self = Self {
        container: "webm",
        video_codec: "libvpx",
        audio_codec: Some("libvorbis"),
        mime_type: "video/webm",
        extension: "webm",
    };
    /// MPEG-4 Part 2 + AAC, available in minimal ffmpeg builds.
    pub const MP4_MPEG4: Self = Self {
        container: "mp4",
        video_codec: "mpeg4",
        audio_codec: Some("aac"),
        mime_type: "video/mp4",
        extension: "mp4",
    };
    /// Concatenated raw RGBA frames.
    pub const RAW_RGBA: Self = Self {
        container: "rawvideo",
        video_codec: "rawvideo",
        audio_codec: None,
        mime_type: "application/octet-stream",
        extension: "rgba",
    };

    /// Encoded formats in fallback order.
    pub const FALLBACK_ORDER: [Self; 4] = [
        Self::MP4_H264,
        Self::WEBM_VP9,
        Self::WEBM_VP8,
        Self::MP4_MPEG4,
    ];

    fn codec_aliases(self) -> &'static [&'static str] {
        match self.video_codec {
            "libx264" => &["h264", "avc", "avc1", "libx264"],
            "libvpx-vp9" => &["vp9", "vp09", "libvpx-vp9"],
            "libvpx" => &["vp8", "libvpx"],
            "mpeg4" => &["mpeg4", "mp4v"],
            _ => &[],
        }
    }

    /// Whether a preference string such as `"webm"`, `"vp9"` or `"video/mp4;codecs=avc1"`
    /// names this format.
    pub fn matches(self, preference: &str) -> bool {
        let pref = preference.trim().to_ascii_lowercase();
        let (base, params) = match pref.split_once(';') {
            Some((b, p)) => (b.trim(), Some(p.trim())),
            None => (pref.as_str(), None),
        };
        let base = base.strip_prefix("video/").unwrap_or(base);

        let codecs: Vec<&str> = params
            .and_then(|p| p.strip_prefix("codecs="))
            .map(|c| {
                c.trim_matches('"')
                    .split(',')
                    .map(|s| s.trim().split('.').next().unwrap_or(""))
                    .collect()
            })
            .unwrap_or_default();

        let container_ok = base == self.container;
        let base_is_codec = self.codec_aliases().contains(&base);
        if !container_ok && !base_is_codec {
            return false;
        }
        codecs.is_empty() || codecs.iter().any(|c| self.codec_aliases().contains(c))
    }
}

/// Pick the first format the host can encode, honouring `preference` first.
///
/// With `with_audio` the format's audio encoder must be available too.
pub fn select_format(
    preference: Option<&str>,
    available: &HashSet<String>,
    with_audio: bool,
) -> AftermovieResult<OutputFormat> {
    let supported = |f: &OutputFormat| {
        available.contains(f.video_codec)
            && (!with_audio || f.audio_codec.is_some_and(|a| available.contains(a)))
    };

    let preferred = preference
        .filter(|p| !p.trim().is_empty())
        .into_iter()
        .flat_map(|p| {
            OutputFormat::FALLBACK_ORDER
                .into_iter()
                .filter(move |f| f.matches(p))
        });
    if let Some(format) = preferred
        .chain(OutputFormat::FALLBACK_ORDER)
        .find(supported)
    {
        if let Some(p) = preference
            && !format.matches(p)
        {
            tracing::warn!(
                preference = p,
                chosen = format.video_codec,
                "preferred format unavailable"
            );
        }
        return Ok(format);
    }

    Err(AftermovieError::encoder_unavailable(format!(
        "none of {} is available{}",
        OutputFormat::FALLBACK_ORDER
            .iter()
            .map(|f| f.video_codec)
            .collect::<Vec<_>>()
            .join(", "),
        if with_audio { " with audio" } else { "" }
    )))
}

/// Encoder names from `ffmpeg -encoders` output.
pub(crate) fn parse_encoders(text: &str) -> HashSet<String> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("---"))
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let flags = parts.next()?;
            let name = parts.next()?;
            (flags.len() == 6).then(|| name.to_string())
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/format.rs"]
mod tests;
