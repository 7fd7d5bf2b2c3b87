use crate::foundation::core::Fps;
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::model::{MediaItem, MediaKind, RenderOptions};

/// Fixed length of the intro card.
pub const INTRO_MS: u64 = 3000;
/// Fixed length of the outro card.
pub const OUTRO_MS: u64 = 3000;

const BONUS_MS_PER_POINT: f64 = 500.0;
/// Upper bound of the smart-duration popularity bonus.
pub const MAX_POPULARITY_BONUS_MS: u64 = 2000;

/// Minimum on-screen time of a video item.
pub const VIDEO_FLOOR_MS: u64 = 3000;
/// Minimum on-screen time of a video item when smart duration is on.
pub const VIDEO_FLOOR_SMART_MS: u64 = 4000;

/// Extra time granted to a popular item: 500 ms per point, capped at 2 s.
pub fn popularity_bonus_ms(score: Option<f64>) -> u64 {
    let score = score.filter(|s| s.is_finite()).unwrap_or(0.0).max(0.0);
    (score * BONUS_MS_PER_POINT)
        .round()
        .min(MAX_POPULARITY_BONUS_MS as f64) as u64
}

fn video_floor_ms(opts: &RenderOptions) -> u64 {
    if opts.smart_duration {
        VIDEO_FLOOR_SMART_MS
    } else {
        VIDEO_FLOOR_MS
    }
}

/// Duration of an item before transition overlap is taken out.
pub fn base_duration_ms(item: &MediaItem, opts: &RenderOptions) -> u64 {
    let mut ms = opts.item_duration_ms;
    if opts.smart_duration {
        ms += popularity_bonus_ms(item.popularity);
    }
    if item.kind == MediaKind::Video {
        ms = ms.max(video_floor_ms(opts));
    }
    ms
}

/// One item's slot on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledItem {
    /// Position in the input list.
    pub index: usize,
    /// Duration before the transition overlap was subtracted.
    pub base_ms: u64,
    /// On-screen slot, transition tail included.
    pub duration_ms: u64,
    /// Frames of the slot.
    pub frames: u64,
    /// Trailing frames of the slot spent transitioning into the next item.
    pub transition_frames: u64,
}

/// Frame-accurate layout of a whole render.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    /// Output frame rate.
    pub fps: Fps,
    /// Intro card length (`0` when disabled).
    pub intro_ms: u64,
    /// Outro card length (`0` when disabled).
    pub outro_ms: u64,
    /// Item slots in presentation order.
    pub items: Vec<ScheduledItem>,
}

impl Timeline {
    /// Lay out `items` according to `opts`.
    ///
    /// With transitions on, every item but the last gives up the transition length to the overlap,
    /// never going below half its base duration nor below the video floor.
    #[tracing::instrument(level = "debug", skip_all, fields(items = items.len()))]
    pub fn schedule(items: &[MediaItem], opts: &RenderOptions) -> AftermovieResult<Self> {
        if items.is_empty() {
            return Err(AftermovieError::invalid_input("no media items to render"));
        }
        opts.validate()?;
        let fps = opts.frame_rate()?;
        let transitions = opts.transitions_enabled();
        let last = items.len() - 1;

        let scheduled = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let base_ms = base_duration_ms(item, opts);
                let mut duration_ms = base_ms;
                let mut transition_frames = 0;
                if transitions && index < last {
                    duration_ms = base_ms
                        .saturating_sub(opts.transition_duration_ms)
                        .max(base_ms.div_ceil(2));
                    if item.kind == MediaKind::Video {
                        duration_ms = duration_ms.max(video_floor_ms(opts));
                    }
                    transition_frames =
                        fps.ms_to_frames(opts.transition_duration_ms.min(duration_ms));
                }
                let frames = fps.ms_to_frames(duration_ms);
                ScheduledItem {
                    index,
                    base_ms,
                    duration_ms,
                    frames,
                    transition_frames: transition_frames.min(frames),
                }
            })
            .collect();

        let (intro_ms, outro_ms) = if opts.intro_outro {
            (INTRO_MS, OUTRO_MS)
        } else {
            (0, 0)
        };
        Ok(Self {
            fps,
            intro_ms,
            outro_ms,
            items: scheduled,
        })
    }

    pub fn intro_frames(&self) -> u64 {
        self.fps.ms_to_frames(self.intro_ms)
    }

    pub fn outro_frames(&self) -> u64 {
        self.fps.ms_to_frames(self.outro_ms)
    }

    /// Sum of the adjusted item durations.
    pub fn items_ms(&self) -> u64 {
        self.items.iter().map(|it| it.duration_ms).sum()
    }

    /// Intro + items + outro.
    pub fn total_ms(&self) -> u64 {
        self.intro_ms + self.items_ms() + self.outro_ms
    }

    pub fn total_secs(&self) -> f64 {
        self.total_ms() as f64 / 1000.0
    }

    /// Frames the render submits when every item loads.
    pub fn total_frames(&self) -> u64 {
        self.intro_frames()
            + self.items.iter().map(|it| it.frames).sum::<u64>()
            + self.outro_frames()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timeline.rs"]
mod tests;
