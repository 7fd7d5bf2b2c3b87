use std::path::PathBuf;

use crate::assets::color::parse_hex;
use crate::effects::transitions::TransitionKind;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{AftermovieError, AftermovieResult};

/// Largest frame rate accepted by [`RenderOptions::validate`].
pub const MAX_FPS: u32 = 60;

/// Kind of a [`MediaItem`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image, animated with Ken-Burns motion.
    #[default]
    Photo,
    /// Video clip, resampled to fit its slot.
    Video,
}

/// One photo or clip of the event, in presentation order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaItem {
    /// Caller-side identifier, only used in log and progress messages.
    #[serde(default)]
    pub id: String,
    /// Source location: a path, a `file://` URL, or anything the active loader understands.
    pub url: String,
    /// Photo or video.
    #[serde(default)]
    pub kind: MediaKind,
    /// Caption shown in the legend or speech bubble.
    #[serde(default)]
    pub caption: Option<String>,
    /// Author credited under the caption.
    #[serde(default)]
    pub author: Option<String>,
    /// Popularity score (for example a like count) used by smart duration.
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Intrinsic clip duration when the caller already knows it.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

impl MediaItem {
    /// Photo item without caption or metadata.
    pub fn photo(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            kind: MediaKind::Photo,
            caption: None,
            author: None,
            popularity: None,
            duration_secs: None,
        }
    }

    /// Video item without caption or metadata.
    pub fn video(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            ..Self::photo(id, url)
        }
    }

    pub(crate) fn caption_text(&self) -> Option<&str> {
        non_empty(self.caption.as_deref())
    }

    pub(crate) fn author_text(&self) -> Option<&str> {
        non_empty(self.author.as_deref())
    }
}

/// Immutable settings for one render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate, `0 < fps <= 60`.
    pub fps: u32,
    /// Target video bitrate in bits per second.
    pub bitrate: u64,
    /// Preferred container/codec, e.g. `"mp4"`, `"webm"` or `"video/webm;codecs=vp9"`.
    pub container: Option<String>,
    /// Base on-screen time of every item.
    pub item_duration_ms: u64,
    /// Animate items with pan/zoom.
    pub ken_burns: bool,
    /// Render the intro and outro title cards.
    pub intro_outro: bool,
    /// Extend popular items and lengthen video floors.
    pub smart_duration: bool,
    /// Show captions as comic speech bubbles.
    pub comic_captions: bool,
    /// Show the cinematic caption legend.
    pub title_overlay: bool,
    /// Draw the decorative frame image on top of every frame.
    pub decorative_frame: bool,
    /// Draw a random transition kind for every slot.
    pub random_transitions: bool,
    /// Transition used when random selection is off. `None` disables transitions.
    #[serde(deserialize_with = "deserialize_transition")]
    pub transition: Option<TransitionKind>,
    /// Length of every transition.
    pub transition_duration_ms: u64,
    /// Background fill as `#RRGGBB` or `#RRGGBBAA`.
    pub background: String,
    /// Event title, used on the intro card and as legend fallback.
    pub title_text: Option<String>,
    /// Subtitle shown under the intro title.
    pub subtitle_text: Option<String>,
    /// Text of the outro card.
    pub outro_text: String,
    /// Decorative frame image (raster or SVG).
    pub frame_url: Option<String>,
    /// TTF/OTF font used for every text overlay.
    pub font_path: Option<PathBuf>,
    /// Seed for the Ken-Burns and random transition draws.
    pub seed: Option<u64>,
    /// Sleep out the per-frame wall-clock budget.
    pub realtime_pacing: bool,
    /// Bounded wait for a video seek to produce its frame.
    pub seek_timeout_ms: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
            bitrate: 5_000_000,
            container: None,
            item_duration_ms: 3000,
            ken_burns: true,
            intro_outro: true,
            smart_duration: false,
            comic_captions: false,
            title_overlay: true,
            decorative_frame: false,
            random_transitions: false,
            transition: Some(TransitionKind::Fade),
            transition_duration_ms: 800,
            background: "#000000".to_string(),
            title_text: None,
            subtitle_text: None,
            outro_text: "Thanks for watching".to_string(),
            frame_url: None,
            font_path: None,
            seed: None,
            realtime_pacing: false,
            seek_timeout_ms: 3000,
        }
    }
}

impl RenderOptions {
    /// Check the numeric preconditions of a render.
    pub fn validate(&self) -> AftermovieResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AftermovieError::invalid_input(format!(
                "width/height must be > 0 (got {}x{})",
                self.width, self.height
            )));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(AftermovieError::invalid_input(format!(
                "width/height must be <= {} (got {}x{})",
                u16::MAX,
                self.width,
                self.height
            )));
        }
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(AftermovieError::invalid_input(format!(
                "fps must be in 1..={MAX_FPS} (got {})",
                self.fps
            )));
        }
        if self.item_duration_ms == 0 {
            return Err(AftermovieError::invalid_input("item_duration_ms must be > 0"));
        }
        if self.bitrate == 0 {
            return Err(AftermovieError::invalid_input("bitrate must be > 0"));
        }
        if self.transitions_enabled() && self.transition_duration_ms > self.item_duration_ms {
            return Err(AftermovieError::invalid_input(format!(
                "transition_duration_ms ({}) must not exceed item_duration_ms ({})",
                self.transition_duration_ms, self.item_duration_ms
            )));
        }
        self.background_rgba()?;
        Ok(())
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Output frame rate as a rational.
    pub fn frame_rate(&self) -> AftermovieResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Background as straight-alpha RGBA8.
    pub fn background_rgba(&self) -> AftermovieResult<[u8; 4]> {
        parse_hex(&self.background).map_err(|e| {
            AftermovieError::invalid_input(format!("background '{}': {e}", self.background))
        })
    }

    /// Whether adjacent items are cross-composited at all.
    pub fn transitions_enabled(&self) -> bool {
        (self.random_transitions || self.transition.is_some()) && self.transition_duration_ms > 0
    }

    pub(crate) fn title(&self) -> Option<&str> {
        non_empty(self.title_text.as_deref())
    }

    pub(crate) fn frame_source(&self) -> Option<&str> {
        if !self.decorative_frame {
            return None;
        }
        non_empty(self.frame_url.as_deref())
    }
}

fn deserialize_transition<'de, D>(deserializer: D) -> Result<Option<TransitionKind>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") | Some("none") => Ok(None),
        Some(name) => TransitionKind::from_name(name)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown transition '{name}'"))),
    }
}

/// Soundtrack mixed under the video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioOptions {
    /// Audio file (any format `ffmpeg` decodes).
    pub path: PathBuf,
    /// Playback gain, clamped to `[0, 1]`.
    #[serde(default = "full_volume")]
    pub volume: f32,
    /// Repeat the track until the video ends.
    #[serde(default, rename = "loop")]
    pub looped: bool,
}

fn full_volume() -> f32 {
    1.0
}

impl AudioOptions {
    /// Full-volume, non-looping soundtrack.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            volume: 1.0,
            looped: false,
        }
    }

    pub(crate) fn gain(&self) -> f32 {
        if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Coarse phase of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStage {
    /// Media prefetch, soundtrack and encoder setup.
    Loading,
    /// Frames are being drawn and submitted.
    Rendering,
    /// Waiting for the encoder to drain.
    Encoding,
    /// Terminal event.
    Done,
}

/// Progress event emitted during a render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderProgress {
    /// Current phase.
    pub stage: RenderStage,
    /// Items processed so far.
    pub processed: usize,
    /// Items in the render.
    pub total: usize,
    /// Human-readable status.
    pub message: String,
}

/// Finished video.
#[derive(Clone, Debug)]
pub struct Aftermovie {
    /// Encoded container bytes.
    pub data: Vec<u8>,
    /// Resolved mime type, e.g. `video/mp4`.
    pub mime_type: String,
    /// Suggested download name.
    pub file_name: String,
    /// Rendered duration in seconds.
    pub duration_secs: f64,
    /// Frames submitted to the encoder.
    pub frames: u64,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "../tests/unit/model.rs"]
mod tests;
