//! Aftermovie turns an ordered list of event photos and clips into one encoded highlight video.
//!
//! A render schedules every item on a timeline, draws Ken-Burns animated frames with transitions,
//! captions, title cards and a decorative frame on the CPU, mixes an optional soundtrack and
//! streams the frames into an encoder:
//!
//! - Describe the media as [`MediaItem`]s and the look as [`RenderOptions`]
//! - Call [`generate`], or configure an [`AftermovieSession`] for custom loaders and sinks
//! - Receive an [`Aftermovie`] (encoded bytes, mime type, suggested file name, duration)
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod audio;
mod effects;
mod encode;
mod foundation;
mod model;
mod render;
mod schedule;
mod session;

pub use crate::assets::cache::{MediaCache, MediaId, PREFETCH_COUNT};
pub use crate::assets::decode::DecodedImage;
pub use crate::assets::loader::{
    DEFAULT_MAX_DIMENSION, FfmpegClip, FsMediaLoader, MediaLoader, MediaSource, SeekState,
    VideoClip,
};
pub use crate::assets::media::{is_tool_on_path, probe_video};
pub use crate::effects::transitions::{LayerPose, TransitionFrame, TransitionKind};
pub use crate::encode::ffmpeg::{FfmpegSink, probe_encoders};
pub use crate::encode::format::{OutputFormat, select_format};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{AftermovieError, AftermovieResult};
pub use crate::model::{
    Aftermovie, AudioOptions, MAX_FPS, MediaItem, MediaKind, RenderOptions, RenderProgress,
    RenderStage,
};
pub use crate::render::frame::FrameRGBA;
pub use crate::schedule::plan::TransitionPlan;
pub use crate::schedule::timelapse::{
    MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE, playback_rate, timelapse_position,
};
pub use crate::schedule::timeline::{
    INTRO_MS, MAX_POPULARITY_BONUS_MS, OUTRO_MS, ScheduledItem, Timeline, VIDEO_FLOOR_MS,
    VIDEO_FLOOR_SMART_MS, base_duration_ms, popularity_bonus_ms,
};
pub use crate::session::naming::suggested_file_name;
pub use crate::session::{AftermovieSession, ProgressFn, generate};
