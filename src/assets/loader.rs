use std::collections::{HashMap, VecDeque};
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::assets::decode::{DecodedImage, decode_image, parse_svg};
use crate::assets::media::{VideoSourceInfo, fit_within, frame_decode_command, probe_video};
use crate::assets::svg_raster::rasterize_svg;
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::model::MediaKind;

/// Default bound on the longest side of decoded photos and video frames.
pub const DEFAULT_MAX_DIMENSION: u32 = 4096;

const WAIT_SLICE: Duration = Duration::from_millis(20);
const FRAME_CACHE_CAPACITY: usize = 48;

/// A loaded media source.
pub enum MediaSource {
    /// Immutable decoded bitmap.
    Photo(Arc<DecodedImage>),
    /// Seekable playback handle.
    Video(Box<dyn VideoClip>),
}

impl std::fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Photo(img) => write!(f, "Photo({}x{})", img.width, img.height),
            Self::Video(clip) => write!(f, "Video({}x{})", clip.width(), clip.height()),
        }
    }
}

/// Outcome of waiting for a seek.
#[derive(Clone, Debug)]
pub enum SeekState {
    /// The frame at the requested position.
    Ready(Arc<DecodedImage>),
    /// The bounded wait elapsed before the frame arrived.
    TimedOut,
}

/// Seekable video playback handle.
///
/// A seek is issued with [`VideoClip::seek`] and acknowledged by [`VideoClip::wait_ready`].
/// Dropping the handle releases every decoder resource it owns.
pub trait VideoClip: Send {
    /// Frame width in pixels.
    fn width(&self) -> u32;
    /// Frame height in pixels.
    fn height(&self) -> u32;
    /// Intrinsic duration, `None` when the container does not report one.
    fn duration_secs(&self) -> Option<f64>;
    /// Move the playback head.
    fn seek(&mut self, time_secs: f64) -> AftermovieResult<()>;
    /// Wait (bounded) until the frame of the last seek is available.
    fn wait_ready(
        &mut self,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> AftermovieResult<SeekState>;
    /// Last frame that became ready, if any.
    fn current_frame(&self) -> Option<Arc<DecodedImage>>;
}

/// Resolves media URLs into decoded sources.
pub trait MediaLoader: Send + Sync {
    /// Fetch and decode a still image.
    fn load_image(&self, url: &str) -> AftermovieResult<DecodedImage>;
    /// Open a seekable video.
    fn open_video(&self, url: &str) -> AftermovieResult<Box<dyn VideoClip>>;

    /// Fetch the decorative frame, rasterised at `width x height` when the format is vector.
    fn load_overlay(&self, url: &str, width: u32, height: u32) -> AftermovieResult<DecodedImage> {
        let _ = (width, height);
        self.load_image(url)
    }

    /// Dispatch on the item kind.
    fn load(&self, url: &str, kind: MediaKind) -> AftermovieResult<MediaSource> {
        match kind {
            MediaKind::Photo => Ok(MediaSource::Photo(Arc::new(self.load_image(url)?))),
            MediaKind::Video => Ok(MediaSource::Video(self.open_video(url)?)),
        }
    }
}

/// Loader for local files: plain paths, `file://` URLs and paths relative to an assets root.
#[derive(Clone, Debug)]
pub struct FsMediaLoader {
    root: PathBuf,
    max_dimension: u32,
}

impl FsMediaLoader {
    /// Resolve relative URLs against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    /// Bound the longest side of decoded media.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(2);
        self
    }

    /// Map a media URL to a local path.
    pub fn resolve(&self, url: &str) -> AftermovieResult<PathBuf> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(AftermovieError::media_load(url, "empty url"));
        }
        if trimmed.contains("://") {
            let parsed = url::Url::parse(trimmed)
                .map_err(|e| AftermovieError::media_load(url, format!("invalid url: {e}")))?;
            if parsed.scheme() != "file" {
                return Err(AftermovieError::media_load(
                    url,
                    format!("unsupported url scheme '{}'", parsed.scheme()),
                ));
            }
            return parsed
                .to_file_path()
                .map_err(|_| AftermovieError::media_load(url, "file url has no local path"));
        }
        let p = Path::new(trimmed);
        if p.is_absolute() {
            Ok(p.to_path_buf())
        } else {
            Ok(self.root.join(p))
        }
    }
}

impl MediaLoader for FsMediaLoader {
    fn load_image(&self, url: &str) -> AftermovieResult<DecodedImage> {
        let path = self.resolve(url)?;
        let bytes = std::fs::read(&path).map_err(|e| {
            AftermovieError::media_load(url, format!("failed to read '{}': {e}", path.display()))
        })?;
        decode_image(&bytes, self.max_dimension)
            .map_err(|e| AftermovieError::media_load(url, e.to_string()))
    }

    fn load_overlay(&self, url: &str, width: u32, height: u32) -> AftermovieResult<DecodedImage> {
        let path = self.resolve(url)?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        if !is_svg {
            return self.load_image(url);
        }
        let bytes = std::fs::read(&path).map_err(|e| {
            AftermovieError::media_load(url, format!("failed to read '{}': {e}", path.display()))
        })?;
        let tree = parse_svg(&bytes).map_err(|e| AftermovieError::media_load(url, e.to_string()))?;
        rasterize_svg(&tree, width, height)
            .map_err(|e| AftermovieError::media_load(url, e.to_string()))
    }

    fn open_video(&self, url: &str) -> AftermovieResult<Box<dyn VideoClip>> {
        let path = self.resolve(url)?;
        if !path.is_file() {
            return Err(AftermovieError::media_load(
                url,
                format!("'{}' is not a file", path.display()),
            ));
        }
        let info = probe_video(&path)?;
        Ok(Box::new(FfmpegClip::spawn(info, self.max_dimension)?))
    }
}

struct FrameRequest {
    seq: u64,
    key_ms: u64,
}

struct FrameReply {
    seq: u64,
    key_ms: u64,
    result: AftermovieResult<DecodedImage>,
}

/// [`VideoClip`] decoding frames with `ffmpeg` on a worker thread.
pub struct FfmpegClip {
    info: VideoSourceInfo,
    out_w: u32,
    out_h: u32,

    requests: Option<mpsc::Sender<FrameRequest>>,
    replies: mpsc::Receiver<FrameReply>,
    worker: Option<JoinHandle<()>>,
    running: Arc<Mutex<Option<Child>>>,
    stop: Arc<AtomicBool>,

    next_seq: u64,
    pending: Option<FrameRequestKey>,
    frame_cache: HashMap<u64, Arc<DecodedImage>>,
    lru: VecDeque<u64>,
    current: Option<Arc<DecodedImage>>,
}

#[derive(Clone, Copy, Debug)]
struct FrameRequestKey {
    seq: u64,
    key_ms: u64,
}

impl FfmpegClip {
    /// Start the decoder worker for a probed source.
    pub fn spawn(info: VideoSourceInfo, max_dimension: u32) -> AftermovieResult<Self> {
        let (out_w, out_h) = fit_within(info.width, info.height, max_dimension);
        let (req_tx, req_rx) = mpsc::channel::<FrameRequest>();
        let (rep_tx, rep_rx) = mpsc::channel::<FrameReply>();
        let running = Arc::new(Mutex::new(None));
        let stop = Arc::new(AtomicBool::new(false));

        let url = info.source_path.display().to_string();
        let worker = {
            let info = info.clone();
            let running = running.clone();
            let stop = stop.clone();
            std::thread::Builder::new()
                .name("aftermovie-video-decode".to_string())
                .spawn(move || {
                    decode_worker(&info, out_w, out_h, req_rx, rep_tx, &running, &stop)
                })
                .map_err(|e| {
                    AftermovieError::media_load(url, format!("failed to spawn decoder thread: {e}"))
                })?
        };

        Ok(Self {
            info,
            out_w,
            out_h,
            requests: Some(req_tx),
            replies: rep_rx,
            worker: Some(worker),
            running,
            stop,
            next_seq: 0,
            pending: None,
            frame_cache: HashMap::new(),
            lru: VecDeque::new(),
            current: None,
        })
    }

    fn url(&self) -> String {
        self.info.source_path.display().to_string()
    }

    fn insert_frame(&mut self, key: u64, image: Arc<DecodedImage>) {
        self.frame_cache.insert(key, image);
        self.touch(key);
        while self.lru.len() > FRAME_CACHE_CAPACITY {
            if let Some(old) = self.lru.pop_front() {
                self.frame_cache.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|x| *x == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

impl VideoClip for FfmpegClip {
    fn width(&self) -> u32 {
        self.out_w
    }

    fn height(&self) -> u32 {
        self.out_h
    }

    fn duration_secs(&self) -> Option<f64> {
        self.info.duration_secs
    }

    fn seek(&mut self, time_secs: f64) -> AftermovieResult<()> {
        let key_ms = (time_secs.max(0.0) * 1000.0).round() as u64;
        if let Some(img) = self.frame_cache.get(&key_ms).cloned() {
            self.touch(key_ms);
            self.current = Some(img);
            self.pending = None;
            return Ok(());
        }
        if matches!(self.pending, Some(p) if p.key_ms == key_ms) {
            return Ok(());
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| AftermovieError::media_load(self.url(), "video clip is closed"))?;
        sender
            .send(FrameRequest { seq, key_ms })
            .map_err(|_| AftermovieError::media_load(self.url(), "decoder worker stopped"))?;
        self.pending = Some(FrameRequestKey { seq, key_ms });
        Ok(())
    }

    fn wait_ready(
        &mut self,
        timeout: Duration,
        cancel: &CancelToken,
    ) -> AftermovieResult<SeekState> {
        let Some(pending) = self.pending else {
            return Ok(match self.current.clone() {
                Some(img) => SeekState::Ready(img),
                None => SeekState::TimedOut,
            });
        };

        let deadline = Instant::now() + timeout;
        loop {
            cancel.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(SeekState::TimedOut);
            }
            match self.replies.recv_timeout((deadline - now).min(WAIT_SLICE)) {
                Ok(reply) => {
                    let is_current = reply.seq == pending.seq;
                    match reply.result {
                        Ok(img) => {
                            let img = Arc::new(img);
                            self.insert_frame(reply.key_ms, img.clone());
                            if is_current {
                                self.pending = None;
                                self.current = Some(img.clone());
                                return Ok(SeekState::Ready(img));
                            }
                        }
                        Err(e) if is_current => {
                            self.pending = None;
                            return Err(e);
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "stale video frame failed to decode");
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.pending = None;
                    return Err(AftermovieError::media_load(self.url(), "decoder worker stopped"));
                }
            }
        }
    }

    fn current_frame(&self) -> Option<Arc<DecodedImage>> {
        self.current.clone()
    }
}

impl Drop for FfmpegClip {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Ok(mut guard) = self.running.lock()
            && let Some(child) = guard.as_mut()
        {
            let _ = child.kill();
        }
        drop(self.requests.take());
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!(source = %self.url(), "video decode worker panicked");
        }
    }
}

fn decode_worker(
    info: &VideoSourceInfo,
    out_w: u32,
    out_h: u32,
    requests: mpsc::Receiver<FrameRequest>,
    replies: mpsc::Sender<FrameReply>,
    running: &Mutex<Option<Child>>,
    stop: &AtomicBool,
) {
    while let Ok(mut req) = requests.recv() {
        // Only the newest seek matters.
        while let Ok(newer) = requests.try_recv() {
            req = newer;
        }
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let result = decode_frame(info, req.key_ms, out_w, out_h, running, stop);
        let reply = FrameReply {
            seq: req.seq,
            key_ms: req.key_ms,
            result,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
}

fn decode_frame(
    info: &VideoSourceInfo,
    key_ms: u64,
    out_w: u32,
    out_h: u32,
    running: &Mutex<Option<Child>>,
    stop: &AtomicBool,
) -> AftermovieResult<DecodedImage> {
    let url = info.source_path.display().to_string();
    let time_secs = key_ms as f64 / 1000.0;
    let mut child = frame_decode_command(info, time_secs, out_w, out_h)
        .spawn()
        .map_err(|e| AftermovieError::media_load(&url, format!("failed to spawn ffmpeg: {e}")))?;
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| AftermovieError::media_load(&url, "failed to open ffmpeg stdout"))?;
    let mut stderr = child.stderr.take();

    {
        let mut guard = running
            .lock()
            .map_err(|_| AftermovieError::media_load(&url, "decoder state poisoned"))?;
        if stop.load(Ordering::Relaxed) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AftermovieError::media_load(&url, "video clip closed"));
        }
        *guard = Some(child);
    }

    let expected_len = out_w as usize * out_h as usize * 4;
    let mut buf = Vec::with_capacity(expected_len);
    let read = stdout.read_to_end(&mut buf);

    let child = running.lock().ok().and_then(|mut g| g.take());
    let status = child.map(|mut c| c.wait());
    let mut stderr_text = String::new();
    if let Some(err) = stderr.as_mut() {
        let _ = err.read_to_string(&mut stderr_text);
    }

    read.map_err(|e| AftermovieError::media_load(&url, format!("ffmpeg read failed: {e}")))?;
    if let Some(Ok(status)) = status
        && !status.success()
    {
        return Err(AftermovieError::media_load(
            &url,
            format!("ffmpeg frame decode failed: {}", stderr_text.trim()),
        ));
    }
    if buf.len() < expected_len {
        return Err(AftermovieError::media_load(
            &url,
            format!(
                "decoded frame at {time_secs:.3}s has {} bytes, expected {expected_len}",
                buf.len()
            ),
        ));
    }
    buf.truncate(expected_len);
    DecodedImage::from_straight_rgba8(out_w, out_h, buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
