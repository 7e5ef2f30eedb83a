use std::sync::{
    Mutex, MutexGuard, PoisonError, TryLockError,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use crate::render::{
    outcome::RenderOutcome,
    renderer::{Renderer, RendererStats},
};

/// Gate counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct GateStats {
    /// Calls to [`RenderGate::try_render`].
    pub attempts: u64,
    /// Calls that returned `Skipped`.
    pub skipped: u64,
}

/// Non-blocking single-flight wrapper around a [`Renderer`].
///
/// Built for display-refresh callbacks: a tick that arrives while the previous render is still in
/// flight returns [`RenderOutcome::Skipped`] immediately instead of queueing. At most one render
/// executes at any instant. The busy flag is released on every exit path, unwinding included.
pub struct RenderGate {
    busy: AtomicBool,
    renderer: Mutex<Renderer>,
    attempts: AtomicU64,
    skipped: AtomicU64,
}

struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl RenderGate {
    /// Take ownership of `renderer`.
    pub fn new(renderer: Renderer) -> Self {
        Self {
            busy: AtomicBool::new(false),
            renderer: Mutex::new(renderer),
            attempts: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        }
    }

    /// Render at `timestamp_ms` unless a render is already in flight.
    pub fn try_render(&self, timestamp_ms: i64) -> RenderOutcome {
        self.attempts.fetch_add(1, Ordering::Relaxed);

        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            return self.skip(timestamp_ms);
        };

        // Control operations hold the lock without the busy flag.
        let mut renderer = match self.renderer.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return self.skip(timestamp_ms),
            Err(TryLockError::Poisoned(poisoned)) => self.recover(poisoned),
        };
        renderer.render(timestamp_ms)
    }

    /// Whether a render is in flight right now.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// See [`Renderer::set_playback_mode`]. Waits for an in-flight render.
    pub fn set_playback_mode(&self, enabled: bool) {
        self.lock().set_playback_mode(enabled);
    }

    /// See [`Renderer::flush`]. Waits for an in-flight render.
    pub fn flush(&self) {
        self.lock().flush();
    }

    /// See [`Renderer::destroy`]. Waits for an in-flight render.
    pub fn destroy(&self) {
        self.lock().destroy();
    }

    /// One frame at the renderer's rate, in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        self.lock().frame_interval_ms()
    }

    /// Gate counters.
    pub fn stats(&self) -> GateStats {
        GateStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }

    /// Counters of the wrapped renderer. Waits for an in-flight render.
    pub fn renderer_stats(&self) -> RendererStats {
        self.lock().stats()
    }

    /// Unwrap the renderer.
    pub fn into_inner(self) -> Renderer {
        self.renderer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn skip(&self, timestamp_ms: i64) -> RenderOutcome {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(timestamp_ms, "render skipped, gate busy");
        RenderOutcome::Skipped
    }

    fn lock(&self) -> MutexGuard<'_, Renderer> {
        match self.renderer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => self.recover(poisoned),
        }
    }

    fn recover<'a>(
        &'a self,
        poisoned: PoisonError<MutexGuard<'a, Renderer>>,
    ) -> MutexGuard<'a, Renderer> {
        tracing::warn!("renderer panicked during a previous render, flushing");
        let mut guard = poisoned.into_inner();
        guard.flush();
        self.renderer.clear_poison();
        guard
    }
}

impl std::fmt::Debug for RenderGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGate")
            .field("busy", &self.is_busy())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/gate.rs"]
mod tests;
