use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng as _;
use rand::rngs::StdRng;

use crate::assets::cache::MediaCache;
use crate::assets::loader::{FsMediaLoader, MediaLoader, MediaSource, SeekState};
use crate::assets::text::TextEngine;
use crate::audio::soundtrack::Soundtrack;
use crate::effects::ken_burns::ken_burns_table;
use crate::effects::transitions::LayerPose;
use crate::encode::ffmpeg::FfmpegSink;
use crate::encode::session::EncoderSession;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::model::{Aftermovie, AudioOptions, MediaItem, RenderOptions, RenderProgress, RenderStage};
use crate::render::frame::FrameRGBA;
use crate::render::overlay::{Caption, caption_opacity};
use crate::render::painter::Painter;
use crate::schedule::plan::TransitionPlan;
use crate::schedule::timelapse::{effective_clip_secs, playback_rate, timelapse_position};
use crate::schedule::timeline::Timeline;
use crate::session::render::{RenderRun, Reporter};

pub(crate) mod naming;
pub(crate) mod render;

pub use render::ProgressFn;

/// One render of an item list into an encoded aftermovie.
///
/// Defaults: media from the working directory through [`FsMediaLoader`], encoding through the
/// system `ffmpeg` ([`FfmpegSink`]), no soundtrack, no progress callback.
pub struct AftermovieSession {
    options: RenderOptions,
    loader: Option<Arc<dyn MediaLoader>>,
    sink: Option<Box<dyn FrameSink>>,
    audio: Option<AudioOptions>,
    on_progress: Option<ProgressFn>,
    cancel: CancelToken,
}

impl AftermovieSession {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            loader: None,
            sink: None,
            audio: None,
            on_progress: None,
            cancel: CancelToken::new(),
        }
    }

    /// Resolve media through `loader`.
    pub fn with_loader(mut self, loader: Arc<dyn MediaLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Deliver frames to `sink` instead of `ffmpeg`.
    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Mix a soundtrack under the video.
    pub fn with_audio(mut self, audio: Option<AudioOptions>) -> Self {
        self.audio = audio;
        self
    }

    pub fn on_progress(mut self, callback: ProgressFn) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Observe `cancel` at every frame, load and seek.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn default_loader(&self) -> Arc<dyn MediaLoader> {
        let max_dim = self.options.width.max(self.options.height) * 3 / 2;
        Arc::new(FsMediaLoader::new(".").with_max_dimension(max_dim))
    }

    /// Render `items` in order.
    ///
    /// Items whose media cannot be loaded are skipped. Every other failure, and cancellation,
    /// stops the encoder and releases the soundtrack and media before returning.
    #[tracing::instrument(level = "info", skip_all, fields(items = items.len()))]
    pub fn run(mut self, items: &[MediaItem]) -> AftermovieResult<Aftermovie> {
        if items.is_empty() {
            return Err(AftermovieError::invalid_input("no media items to render"));
        }
        self.options.validate()?;
        let opts = &self.options;
        let cancel = self.cancel.clone();
        let mut reporter = Reporter::new(self.on_progress.take(), items.len());

        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let timeline = Timeline::schedule(items, opts)?;
        let planned_ms = timeline.total_ms();
        let ken_burns = ken_burns_table(items.len(), opts.ken_burns, &mut rng);
        let plan = TransitionPlan::new(items.len(), opts, &mut rng);
        tracing::info!(
            total_ms = timeline.total_ms(),
            frames = timeline.total_frames(),
            "timeline scheduled"
        );

        reporter.emit(RenderStage::Loading, 0, "Loading media");
        let loader = match self.loader.take() {
            Some(loader) => loader,
            None => self.default_loader(),
        };
        let mut cache = MediaCache::new(loader.clone());
        cache.prefetch(items)?;

        let soundtrack = match self.audio.as_ref() {
            Some(audio) => {
                reporter.emit(RenderStage::Loading, 0, "Preparing soundtrack");
                Some(Soundtrack::prepare(audio, timeline.total_secs(), &cancel)?)
            }
            None => None,
        };

        let mut painter = Painter::new(
            opts.canvas(),
            opts.background_rgba()?,
            TextEngine::discover(opts.font_path.as_deref()),
        )?;
        if let Some(url) = opts.frame_source() {
            match loader
                .load_overlay(url, opts.width, opts.height)
                .and_then(|img| painter.set_frame_overlay(img))
            {
                Ok(()) => {}
                Err(e) => tracing::warn!(url, error = %e, "decorative frame unavailable"),
            }
        }
        cancel.check()?;

        let sink = match self.sink.take() {
            Some(sink) => sink,
            None => Box::new(FfmpegSink::new()),
        };
        let encoder = EncoderSession::start(
            sink,
            SinkConfig {
                width: opts.width,
                height: opts.height,
                fps: timeline.fps,
                audio: soundtrack.as_ref().map(|s| s.input().clone()),
                bitrate: opts.bitrate,
                background: opts.background_rgba()?,
                container: opts.container.clone(),
            },
        )?;

        let outcome = RenderRun {
            items,
            opts,
            timeline,
            ken_burns,
            plan,
            cache,
            painter,
            encoder,
            cancel: &cancel,
            reporter: &mut reporter,
        }
        .execute()?;
        if soundtrack.is_some() && outcome.rendered_ms < planned_ms {
            // The mix was laid out for the full timeline; `-shortest` cuts it at the video end.
            tracing::warn!(
                planned_ms,
                rendered_ms = outcome.rendered_ms,
                "skipped media shortened the video, soundtrack ends without its fade-out"
            );
        }
        drop(soundtrack);

        let file_name = naming::suggested_file_name(
            opts.title(),
            chrono::Local::now().date_naive(),
            outcome.format.extension,
        );
        reporter.emit(RenderStage::Done, items.len(), "Aftermovie ready");
        Ok(Aftermovie {
            data: outcome.data,
            mime_type: outcome.format.mime_type.to_string(),
            file_name,
            duration_secs: outcome.rendered_ms as f64 / 1000.0,
            frames: outcome.frames,
        })
    }

    /// Render the single frame of item `index` at `at` in `[0, 1]` of its slot, without encoding.
    ///
    /// Ken-Burns motion is drawn from the configured seed (0 when unset).
    #[tracing::instrument(level = "debug", skip(self, items))]
    pub fn preview(
        mut self,
        items: &[MediaItem],
        index: usize,
        at: f64,
    ) -> AftermovieResult<FrameRGBA> {
        let item = items.get(index).ok_or_else(|| {
            AftermovieError::invalid_input(format!(
                "item index {index} out of range (0..{})",
                items.len()
            ))
        })?;
        let timeline = Timeline::schedule(items, &self.options)?;
        let loader = match self.loader.take() {
            Some(loader) => loader,
            None => self.default_loader(),
        };
        let opts = &self.options;
        let mut rng = StdRng::seed_from_u64(opts.seed.unwrap_or_default());
        let ken_burns = ken_burns_table(items.len(), opts.ken_burns, &mut rng);
        let at = if at.is_finite() { at.clamp(0.0, 1.0) } else { 0.0 };

        let image = match loader.load(&item.url, item.kind)? {
            MediaSource::Photo(image) => image,
            MediaSource::Video(mut clip) => {
                let sched = timeline.items[index];
                let slot_secs = sched.duration_ms as f64 / 1000.0;
                let known = clip.duration_secs().or(item.duration_secs);
                let frame = (at * sched.frames as f64).round() as u64;
                clip.seek(timelapse_position(
                    frame,
                    timeline.fps.as_f64(),
                    playback_rate(known, slot_secs),
                    effective_clip_secs(known, slot_secs),
                ))?;
                match clip.wait_ready(Duration::from_millis(opts.seek_timeout_ms), &self.cancel)? {
                    SeekState::Ready(image) => image,
                    SeekState::TimedOut => {
                        return Err(AftermovieError::media_load(&item.url, "video seek timed out"));
                    }
                }
            }
        };

        let mut painter = Painter::new(
            opts.canvas(),
            opts.background_rgba()?,
            TextEngine::discover(opts.font_path.as_deref()),
        )?;
        if let Some(url) = opts.frame_source() {
            let overlay = loader.load_overlay(url, opts.width, opts.height)?;
            painter.set_frame_overlay(overlay)?;
        }
        let layer = painter.item_layer(&image, &ken_burns[index], at)?;
        let caption = Caption::for_item(item, opts);
        painter.compose(
            &[(&layer, LayerPose::identity())],
            caption.map(|c| (c, caption_opacity(at))),
        )
    }
}

/// Render `items` to an encoded video with the system `ffmpeg`, loading media from local paths.
///
/// `on_progress` receives `loading`, `rendering`, `encoding` and a final `done` event.
pub fn generate(
    items: &[MediaItem],
    options: RenderOptions,
    audio: Option<AudioOptions>,
    on_progress: Option<Box<dyn FnMut(RenderProgress) + Send>>,
    cancel: Option<CancelToken>,
) -> AftermovieResult<Aftermovie> {
    let mut session = AftermovieSession::new(options).with_audio(audio);
    if let Some(cb) = on_progress {
        session = session.on_progress(cb);
    }
    if let Some(cancel) = cancel {
        session = session.with_cancel(cancel);
    }
    session.run(items)
}
