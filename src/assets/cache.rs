use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::assets::loader::{MediaLoader, MediaSource};
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{AftermovieError, AftermovieResult};
use crate::model::{MediaItem, MediaKind};

/// Items warmed by [`MediaCache::prefetch`] before the render loop starts.
pub const PREFETCH_COUNT: usize = 10;

const PREFETCH_WAIT_SLICE: Duration = Duration::from_millis(25);

/// Stable handle to a cached media source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MediaId(usize);

struct Prefetched {
    url: String,
    kind: MediaKind,
    result: AftermovieResult<MediaSource>,
}

struct Prefetcher {
    rx: mpsc::Receiver<Prefetched>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

/// Render-scoped cache of decoded media, keyed by URL.
///
/// Every URL is loaded at most once per successful load. Loads started by the prefetch thread are
/// awaited instead of re-issued.
pub struct MediaCache {
    loader: Arc<dyn MediaLoader>,
    entries: Vec<Option<MediaSource>>,
    by_url: HashMap<String, MediaId>,
    in_flight: HashSet<String>,
    prefetcher: Option<Prefetcher>,
    loads: u64,
}

impl MediaCache {
    /// Empty cache backed by `loader`.
    pub fn new(loader: Arc<dyn MediaLoader>) -> Self {
        Self {
            loader,
            entries: Vec::new(),
            by_url: HashMap::new(),
            in_flight: HashSet::new(),
            prefetcher: None,
            loads: 0,
        }
    }

    /// Start warming the first [`PREFETCH_COUNT`] distinct URLs on a background thread.
    ///
    /// Failures are dropped; [`MediaCache::load`] retries on demand.
    pub fn prefetch(&mut self, items: &[MediaItem]) -> AftermovieResult<()> {
        if self.prefetcher.is_some() {
            return Ok(());
        }
        let mut seen = HashSet::new();
        let jobs: Vec<(String, MediaKind)> = items
            .iter()
            .filter(|it| !self.by_url.contains_key(&it.url) && seen.insert(it.url.clone()))
            .take(PREFETCH_COUNT)
            .map(|it| (it.url.clone(), it.kind))
            .collect();
        if jobs.is_empty() {
            return Ok(());
        }

        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let loader = self.loader.clone();
        let worker_stop = stop.clone();
        let urls: Vec<String> = jobs.iter().map(|(u, _)| u.clone()).collect();
        let worker = std::thread::Builder::new()
            .name("aftermovie-prefetch".to_string())
            .spawn(move || {
                for (url, kind) in jobs {
                    if worker_stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let result = loader.load(&url, kind);
                    if tx.send(Prefetched { url, kind, result }).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| anyhow::anyhow!("failed to spawn prefetch thread: {e}"))?;

        self.in_flight.extend(urls);
        self.prefetcher = Some(Prefetcher {
            rx,
            worker: Some(worker),
            stop,
        });
        Ok(())
    }

    /// Return the cached source for `url`, loading it on first use.
    pub fn load(
        &mut self,
        url: &str,
        kind: MediaKind,
        cancel: &CancelToken,
    ) -> AftermovieResult<MediaId> {
        cancel.check()?;
        self.absorb_prefetched();
        if let Some(id) = self.by_url.get(url) {
            return Ok(*id);
        }

        while self.in_flight.contains(url) {
            cancel.check()?;
            let Some(pf) = self.prefetcher.as_ref() else {
                self.in_flight.clear();
                break;
            };
            match pf.rx.recv_timeout(PREFETCH_WAIT_SLICE) {
                Ok(done) => self.accept(done),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    self.in_flight.clear();
                    break;
                }
            }
        }
        if let Some(id) = self.by_url.get(url) {
            return Ok(*id);
        }

        tracing::debug!(url, ?kind, "loading media");
        let source = self.loader.load(url, kind)?;
        cancel.check()?;
        Ok(self.insert(url.to_string(), source))
    }

    /// Borrow a cached source.
    pub fn get(&self, id: MediaId) -> Option<&MediaSource> {
        self.entries.get(id.0).and_then(Option::as_ref)
    }

    /// Mutably borrow a cached source (videos need `&mut` to seek).
    pub fn get_mut(&mut self, id: MediaId) -> AftermovieResult<&mut MediaSource> {
        self.entries
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| AftermovieError::Other(anyhow::anyhow!("unknown media id {}", id.0)))
    }

    /// Drop a source that no later item references. A later `load` of its URL fetches again.
    pub fn release(&mut self, id: MediaId) {
        if let Some(slot) = self.entries.get_mut(id.0) {
            *slot = None;
        }
        self.by_url.retain(|_, v| *v != id);
    }

    /// Number of successful underlying loads.
    pub fn load_count(&self) -> u64 {
        self.loads
    }

    /// Number of live cached sources.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Return `true` when no source is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn absorb_prefetched(&mut self) {
        let mut done = Vec::new();
        if let Some(pf) = self.prefetcher.as_ref() {
            while let Ok(item) = pf.rx.try_recv() {
                done.push(item);
            }
        }
        for item in done {
            self.accept(item);
        }
    }

    fn accept(&mut self, done: Prefetched) {
        self.in_flight.remove(&done.url);
        match done.result {
            Ok(source) => {
                if !self.by_url.contains_key(&done.url) {
                    self.insert(done.url, source);
                }
            }
            Err(e) => {
                tracing::debug!(url = %done.url, kind = ?done.kind, error = %e, "prefetch failed");
            }
        }
    }

    fn insert(&mut self, url: String, source: MediaSource) -> MediaId {
        let id = MediaId(self.entries.len());
        self.entries.push(Some(source));
        self.by_url.insert(url, id);
        self.loads += 1;
        id
    }
}

impl Drop for MediaCache {
    fn drop(&mut self) {
        if let Some(mut pf) = self.prefetcher.take() {
            pf.stop.store(true, Ordering::Relaxed);
            if let Some(worker) = pf.worker.take()
                && worker.join().is_err()
            {
                tracing::warn!("media prefetch worker panicked");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
