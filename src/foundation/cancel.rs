use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::foundation::error::{AftermovieError, AftermovieResult};

const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Shared cancellation flag observed by the render loop and its workers.
///
/// Clones share the same flag. Once tripped it stays tripped.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create an untripped token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Return `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Fail with [`AftermovieError::Cancelled`] when tripped.
    pub fn check(&self) -> AftermovieResult<()> {
        if self.is_cancelled() {
            return Err(AftermovieError::Cancelled);
        }
        Ok(())
    }

    /// Sleep for `dur`, waking early with [`AftermovieError::Cancelled`] when tripped.
    pub fn sleep(&self, dur: Duration) -> AftermovieResult<()> {
        let deadline = Instant::now() + dur;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}

/// Per-frame wall-clock pacing.
///
/// With pacing disabled only cancellation is observed between frames.
#[derive(Debug)]
pub(crate) struct Pacer {
    budget: Duration,
    realtime: bool,
    last: Option<Instant>,
}

impl Pacer {
    pub(crate) fn new(fps: u32, realtime: bool) -> Self {
        Self {
            budget: Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1))),
            realtime,
            last: None,
        }
    }

    /// Wait out the remainder of the current frame budget.
    pub(crate) fn tick(&mut self, cancel: &CancelToken) -> AftermovieResult<()> {
        cancel.check()?;
        if self.realtime
            && let Some(last) = self.last
        {
            let spent = last.elapsed();
            if spent < self.budget {
                cancel.sleep(self.budget - spent)?;
            }
        }
        self.last = Some(Instant::now());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/cancel.rs"]
mod tests;
