use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::assets::cache::{MediaCache, MediaId};
use crate::assets::decode::DecodedImage;
use crate::assets::loader::{MediaSource, SeekState};
use crate::effects::ken_burns::KenBurnsParams;
use crate::effects::transitions::{LayerPose, TransitionKind};
use crate::encode::format::OutputFormat;
use crate::encode::session::EncoderSession;
use crate::foundation::cancel::{CancelToken, Pacer};
use crate::foundation::error::AftermovieResult;
use crate::model::{MediaItem, MediaKind, RenderOptions, RenderProgress, RenderStage};
use crate::render::overlay::{Caption, TitleCard, caption_opacity};
use crate::render::painter::Painter;
use crate::schedule::plan::TransitionPlan;
use crate::schedule::timelapse::{effective_clip_secs, playback_rate, timelapse_position};
use crate::schedule::timeline::Timeline;

/// Title shown on the intro card when none is configured.
pub(crate) const DEFAULT_TITLE: &str = "Aftermovie";

/// Ken-Burns progress used when an item is framed statically.
const STATIC_PROGRESS: f64 = 0.5;

/// Progress callback.
pub type ProgressFn = Box<dyn FnMut(RenderProgress) + Send>;

pub(crate) struct Reporter {
    callback: Option<ProgressFn>,
    total: usize,
}

impl Reporter {
    pub(crate) fn new(callback: Option<ProgressFn>, total: usize) -> Self {
        Self { callback, total }
    }

    pub(crate) fn emit(
        &mut self,
        stage: RenderStage,
        processed: usize,
        message: impl Into<String>,
    ) {
        let message = message.into();
        tracing::debug!(?stage, processed, total = self.total, %message, "progress");
        if let Some(cb) = self.callback.as_mut() {
            cb(RenderProgress {
                stage,
                processed,
                total: self.total,
                message,
            });
        }
    }
}

/// One loaded item of the lookahead window.
struct Slot {
    index: usize,
    media: MediaId,
    /// Frames already shown as the incoming side of the previous transition.
    lead_in: u64,
    /// Visible frames in total: lead-in plus the item's own slot.
    window: u64,
    clip_secs: f64,
    rate: f64,
    last_frame: Option<Arc<DecodedImage>>,
}

impl Slot {
    fn progress(&self, visible: u64) -> f64 {
        if self.window <= 1 {
            return 0.0;
        }
        (visible as f64 / (self.window - 1) as f64).clamp(0.0, 1.0)
    }
}

/// Two-slot sliding window: the item on screen and the one it transitions into.
#[derive(Default)]
struct Lookahead {
    active: Option<Slot>,
    pending: Option<Slot>,
}

impl Lookahead {
    /// Make `pending` the new active item and return the one that finished.
    fn rotate(&mut self) -> Option<Slot> {
        std::mem::replace(&mut self.active, self.pending.take())
    }
}

/// What a finished render produced.
pub(crate) struct RenderOutcome {
    pub(crate) data: Vec<u8>,
    pub(crate) format: OutputFormat,
    pub(crate) rendered_ms: u64,
    pub(crate) frames: u64,
}

/// State of one render, from the intro card to the last outro frame.
pub(crate) struct RenderRun<'a> {
    pub(crate) items: &'a [MediaItem],
    pub(crate) opts: &'a RenderOptions,
    pub(crate) timeline: Timeline,
    pub(crate) ken_burns: Vec<KenBurnsParams>,
    pub(crate) plan: TransitionPlan,
    pub(crate) cache: MediaCache,
    pub(crate) painter: Painter,
    pub(crate) encoder: EncoderSession,
    pub(crate) cancel: &'a CancelToken,
    pub(crate) reporter: &'a mut Reporter,
}

impl RenderRun<'_> {
    #[tracing::instrument(level = "info", skip_all, fields(items = self.items.len()))]
    pub(crate) fn execute(mut self) -> AftermovieResult<RenderOutcome> {
        let items = self.items;
        let opts = self.opts;
        let mut pacer = Pacer::new(self.opts.fps, self.opts.realtime_pacing);
        let seek_timeout = Duration::from_millis(self.opts.seek_timeout_ms);
        let blank = Arc::new(DecodedImage::solid(
            self.opts.width,
            self.opts.height,
            premul_background(self.opts)?,
        )?);
        let mut rendered_ms = 0u64;

        if self.timeline.intro_ms > 0 {
            self.reporter.emit(RenderStage::Rendering, 0, "Rendering intro");
            let card = TitleCard {
                title: opts.title().unwrap_or(DEFAULT_TITLE),
                subtitle: non_empty(opts.subtitle_text.as_deref()),
            };
            self.title_card(&card, self.timeline.intro_frames(), &mut pacer)?;
            rendered_ms += self.timeline.intro_ms;
        }

        let mut window = Lookahead::default();
        let mut failed: HashSet<String> = HashSet::new();
        let total = items.len();
        for index in 0..total {
            self.cancel.check()?;
            if window.active.as_ref().map(|s| s.index) != Some(index) {
                window.active = self.open_slot(index, 0, &mut failed)?;
            }
            let Some(mut active) = window.active.take() else {
                self.reporter.emit(
                    RenderStage::Rendering,
                    index + 1,
                    format!("Skipped item {} ({})", index + 1, display_id(&items[index])),
                );
                continue;
            };

            let sched = self.timeline.items[index];
            let kind = self.plan.after(index);
            let tail = if kind.is_some() && index + 1 < total {
                sched.transition_frames
            } else {
                0
            };
            if tail > 0 {
                window.pending = self.open_slot(index + 1, tail, &mut failed)?;
            }

            let solo = sched.frames - tail;
            let caption = Caption::for_item(&items[index], opts);
            for k in 0..solo {
                let visible = active.lead_in + k;
                let t = active.progress(visible);
                let image = self.source_frame(&mut active, visible, seek_timeout, &blank)?;
                let layer = self.painter.item_layer(&image, &self.ken_burns[index], t)?;
                let frame = self.painter.compose(
                    &[(&layer, LayerPose::identity())],
                    caption.map(|c| (c, caption_opacity(t))),
                )?;
                self.encoder.submit(frame)?;
                pacer.tick(self.cancel)?;
            }

            for j in 0..tail {
                let visible = active.lead_in + solo + j;
                let image = self.source_frame(&mut active, visible, seek_timeout, &blank)?;
                let frame = match (kind, window.pending.as_mut()) {
                    (Some(kind), Some(next)) => {
                        let p = (j + 1) as f64 / (tail + 1) as f64;
                        let current = self.painter.item_layer(
                            &image,
                            &self.ken_burns[index],
                            active.progress(visible),
                        )?;
                        let next_image = self.source_frame(next, j, seek_timeout, &blank)?;
                        let incoming = self.painter.item_layer(
                            &next_image,
                            &self.ken_burns[next.index],
                            next.progress(j),
                        )?;
                        self.transition_frame(kind, p, &current, &incoming)?
                    }
                    _ => {
                        let layer = self.painter.item_layer(
                            &image,
                            &self.ken_burns[index],
                            STATIC_PROGRESS,
                        )?;
                        self.painter.compose(
                            &[(&layer, LayerPose::identity())],
                            caption.map(|c| (c, 1.0)),
                        )?
                    }
                };
                self.encoder.submit(frame)?;
                pacer.tick(self.cancel)?;
            }

            rendered_ms += sched.duration_ms;
            window.active = Some(active);
            if let Some(done) = window.rotate() {
                self.release_if_unused(&done);
            }
            self.reporter.emit(
                RenderStage::Rendering,
                index + 1,
                format!("Rendered item {} of {total}", index + 1),
            );
        }
        drop(window);

        if self.timeline.outro_ms > 0 {
            let card = TitleCard {
                title: opts.outro_text.as_str(),
                subtitle: opts.title(),
            };
            self.title_card(&card, self.timeline.outro_frames(), &mut pacer)?;
            rendered_ms += self.timeline.outro_ms;
        }

        self.reporter.emit(RenderStage::Encoding, total, "Finalizing video");
        let frames = self.encoder.submitted();
        let format = self.encoder.format();
        let data = self.encoder.finish()?;
        tracing::info!(
            frames,
            bytes = data.len(),
            loads = self.cache.load_count(),
            "render finished"
        );
        Ok(RenderOutcome {
            data,
            format,
            rendered_ms,
            frames,
        })
    }

    fn title_card(
        &mut self,
        card: &TitleCard<'_>,
        frames: u64,
        pacer: &mut Pacer,
    ) -> AftermovieResult<()> {
        for k in 0..frames {
            let progress = if frames <= 1 {
                1.0
            } else {
                k as f64 / (frames - 1) as f64
            };
            let frame = self.painter.title_card(card, progress)?;
            self.encoder.submit(frame)?;
            pacer.tick(self.cancel)?;
        }
        Ok(())
    }

    fn transition_frame(
        &mut self,
        kind: TransitionKind,
        progress: f64,
        current: &DecodedImage,
        next: &DecodedImage,
    ) -> AftermovieResult<crate::render::frame::FrameRGBA> {
        let canvas = self.painter.canvas();
        let poses = kind.frame(progress, f64::from(canvas.width), f64::from(canvas.height));
        self.painter.compose(&[(current, poses.current), (next, poses.next)], None)
    }

    /// Load item `index` into a slot, or `None` when it cannot be loaded.
    fn open_slot(
        &mut self,
        index: usize,
        lead_in: u64,
        failed: &mut HashSet<String>,
    ) -> AftermovieResult<Option<Slot>> {
        let item = &self.items[index];
        if failed.contains(&item.url) {
            return Ok(None);
        }
        let media = match self.cache.load(&item.url, item.kind, self.cancel) {
            Ok(id) => id,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                tracing::warn!(item = %display_id(item), error = %e, "skipping media item");
                failed.insert(item.url.clone());
                return Ok(None);
            }
        };

        let sched = self.timeline.items[index];
        let slot_secs = sched.duration_ms as f64 / 1000.0;
        let (clip_secs, rate) = match (item.kind, self.cache.get(media)) {
            (MediaKind::Video, Some(MediaSource::Video(clip))) => {
                let known = clip.duration_secs().or(item.duration_secs);
                (
                    effective_clip_secs(known, slot_secs),
                    playback_rate(known, slot_secs),
                )
            }
            _ => (slot_secs, 1.0),
        };
        Ok(Some(Slot {
            index,
            media,
            lead_in,
            window: lead_in + sched.frames,
            clip_secs,
            rate,
            last_frame: None,
        }))
    }

    /// Source image of `slot` at its `visible`-th frame on screen.
    fn source_frame(
        &mut self,
        slot: &mut Slot,
        visible: u64,
        seek_timeout: Duration,
        blank: &Arc<DecodedImage>,
    ) -> AftermovieResult<Arc<DecodedImage>> {
        let fps = self.timeline.fps.as_f64();
        let url = &self.items[slot.index].url;
        let frame = match self.cache.get_mut(slot.media)? {
            MediaSource::Photo(image) => return Ok(image.clone()),
            MediaSource::Video(clip) => {
                let at = timelapse_position(visible, fps, slot.rate, slot.clip_secs);
                match clip
                    .seek(at)
                    .and_then(|_| clip.wait_ready(seek_timeout, self.cancel))
                {
                    Ok(SeekState::Ready(image)) => Some(image),
                    Ok(SeekState::TimedOut) => {
                        tracing::debug!(url, at, "video seek timed out, reusing last frame");
                        clip.current_frame()
                    }
                    Err(e) if e.is_cancelled() => return Err(e),
                    Err(e) => {
                        tracing::warn!(url, at, error = %e, "video frame unavailable");
                        None
                    }
                }
            }
        };
        if let Some(image) = frame {
            slot.last_frame = Some(image.clone());
            return Ok(image);
        }
        Ok(slot.last_frame.clone().unwrap_or_else(|| blank.clone()))
    }

    fn release_if_unused(&mut self, slot: &Slot) {
        let url = &self.items[slot.index].url;
        let reused = self.items[slot.index + 1..].iter().any(|it| &it.url == url);
        if !reused {
            self.cache.release(slot.media);
        }
    }
}

fn premul_background(opts: &RenderOptions) -> AftermovieResult<[u8; 4]> {
    let [r, g, b, a] = opts.background_rgba()?;
    Ok(crate::foundation::core::Rgba8Premul::from_straight_rgba(r, g, b, a).to_array())
}

fn display_id(item: &MediaItem) -> &str {
    if item.id.is_empty() {
        &item.url
    } else {
        &item.id
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
