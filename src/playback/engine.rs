use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering},
};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::{
    foundation::error::{ErrorKind, PreviewError, PreviewResult},
    pipeline::decode::PipelineFactory,
    playback::queue::{DEFAULT_QUEUE_CAPACITY, FrameQueue},
    render::{
        config::RendererConfig, frame::FrameBuffer, outcome::RenderOutcome, renderer::Renderer,
    },
    timeline::model::Timeline,
};

/// Look-ahead and pacing settings of a [`PlaybackEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How far past the play-head the fill thread decodes before idling.
    pub lookahead_ms: i64,
    /// Decoded frames kept ready.
    pub queue_capacity: usize,
    /// Largest distance between a requested timestamp and the frame handed out for it.
    pub frame_tolerance_ms: i64,
    /// Sleep between checks while idle.
    pub idle_poll_ms: u64,
    /// Play-head distance from the decode position that restarts decoding at the play-head.
    pub resync_window_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookahead_ms: 500,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            frame_tolerance_ms: 50,
            idle_poll_ms: 10,
            resync_window_ms: 2000,
        }
    }
}

impl EngineConfig {
    /// Check every field.
    pub fn validate(&self) -> PreviewResult<()> {
        if self.lookahead_ms <= 0 {
            return Err(PreviewError::validation("lookahead_ms must be > 0"));
        }
        if self.queue_capacity == 0 {
            return Err(PreviewError::validation("queue_capacity must be >= 1"));
        }
        if self.frame_tolerance_ms < 0 {
            return Err(PreviewError::validation("frame_tolerance_ms must be >= 0"));
        }
        if self.idle_poll_ms == 0 {
            return Err(PreviewError::validation("idle_poll_ms must be >= 1"));
        }
        if self.resync_window_ms <= self.lookahead_ms {
            return Err(PreviewError::validation(
                "resync_window_ms must be greater than lookahead_ms",
            ));
        }
        Ok(())
    }
}

/// Engine counters for the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EngineStats {
    /// Frames pushed into the queue.
    pub produced: u64,
    /// Warm-up placeholders skipped.
    pub fallbacks: u64,
    /// Failed renders other than end of content.
    pub failures: u64,
    /// Decode restarts at the play-head.
    pub resyncs: u64,
    /// Frames handed out by [`PlaybackEngine::try_get_frame`].
    pub served: u64,
    /// Lookups that found nothing within tolerance.
    pub misses: u64,
}

struct Shared {
    queue: Mutex<FrameQueue>,
    cancelled: AtomicBool,
    play_head_ms: AtomicI64,
    next_ms: AtomicI64,
    produced: AtomicU64,
    fallbacks: AtomicU64,
    failures: AtomicU64,
    resyncs: AtomicU64,
    served: AtomicU64,
    misses: AtomicU64,
}

impl Shared {
    fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(FrameQueue::new(capacity)),
            cancelled: AtomicBool::new(false),
            play_head_ms: AtomicI64::new(0),
            next_ms: AtomicI64::new(0),
            produced: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            resyncs: AtomicU64::new(0),
            served: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn queue(&self) -> MutexGuard<'_, FrameQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset_counters(&self) {
        for c in [
            &self.produced,
            &self.fallbacks,
            &self.failures,
            &self.resyncs,
            &self.served,
            &self.misses,
        ] {
            c.store(0, Ordering::Relaxed);
        }
    }
}

/// Background look-ahead renderer for continuous playback.
///
/// Each run owns a private [`Renderer`] in playback mode, built from the engine's factory; it
/// shares nothing with any other renderer but the read-only timeline. A named fill thread decodes
/// sequentially ahead of the play-head into a bounded [`FrameQueue`], and consumers pick frames
/// out without ever waiting on a decode.
pub struct PlaybackEngine {
    timeline: Arc<Timeline>,
    renderer_config: RendererConfig,
    config: EngineConfig,
    factory: Arc<dyn PipelineFactory>,
    shared: Arc<Shared>,
    fill_thread: Option<JoinHandle<()>>,
}

impl PlaybackEngine {
    /// Validate settings. No thread is started until [`PlaybackEngine::start`].
    pub fn new(
        timeline: Arc<Timeline>,
        renderer_config: RendererConfig,
        config: EngineConfig,
        factory: Arc<dyn PipelineFactory>,
    ) -> PreviewResult<Self> {
        renderer_config.validate()?;
        config.validate()?;
        timeline.validate()?;
        Ok(Self {
            timeline,
            renderer_config,
            shared: Arc::new(Shared::new(config.queue_capacity)),
            config,
            factory,
            fill_thread: None,
        })
    }

    /// Begin (or restart) filling the queue from `start_ms`.
    ///
    /// Any previous run is stopped first. Returns once the fill thread is running; use
    /// [`PlaybackEngine::wait_warm`] to wait for the first frame.
    pub fn start(&mut self, start_ms: i64) -> PreviewResult<()> {
        self.stop();
        if start_ms < 0 {
            return Err(PreviewError::out_of_range(format!(
                "playback start {start_ms}ms is negative"
            )));
        }

        let mut renderer = Renderer::new(
            self.timeline.clone(),
            self.renderer_config.clone(),
            self.factory.as_ref(),
        )?;
        renderer.set_playback_mode(true);

        self.shared.queue().clear();
        self.shared.reset_counters();
        self.shared.cancelled.store(false, Ordering::Release);
        self.shared.play_head_ms.store(start_ms, Ordering::Release);
        self.shared.next_ms.store(start_ms, Ordering::Release);

        let shared = self.shared.clone();
        let config = self.config;
        let handle = std::thread::Builder::new()
            .name("wavyte-preview-fill".to_string())
            .spawn(move || fill_loop(renderer, shared, config, start_ms))
            .map_err(|e| anyhow::Error::new(e).context("failed to spawn playback fill thread"))?;
        self.fill_thread = Some(handle);

        tracing::debug!(start_ms, "playback engine started");
        Ok(())
    }

    /// Copy of the queued frame nearest to `timestamp_ms`, within the frame tolerance.
    ///
    /// Never blocks: returns `None` when the queue is momentarily held by the fill thread.
    /// Records `timestamp_ms` as the play-head.
    pub fn try_get_frame(&self, timestamp_ms: i64) -> Option<FrameBuffer> {
        self.set_play_head(timestamp_ms);
        let frame = match self.shared.queue.try_lock() {
            Ok(q) => q.peek_nearest(timestamp_ms, self.config.frame_tolerance_ms),
            Err(_) => None,
        };
        let counter = if frame.is_some() {
            &self.shared.served
        } else {
            &self.shared.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        frame
    }

    /// Report the consumer's position without requesting a frame.
    pub fn set_play_head(&self, timestamp_ms: i64) {
        self.shared.play_head_ms.store(timestamp_ms, Ordering::Release);
    }

    /// Block up to `timeout` until at least one frame is queued.
    pub fn wait_warm(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let poll = Duration::from_millis(self.config.idle_poll_ms);
        loop {
            if self.queue_len() > 0 {
                return true;
            }
            if !self.is_running() || Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(poll);
        }
    }

    /// Cancel and join the fill thread, then drop queued frames. Idempotent.
    pub fn stop(&mut self) {
        let Some(handle) = self.fill_thread.take() else {
            return;
        };
        self.shared.cancelled.store(true, Ordering::Release);
        if handle.join().is_err() {
            tracing::warn!("playback fill thread panicked");
        }
        self.shared.queue().clear();
        tracing::debug!("playback engine stopped");
    }

    /// `true` between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.fill_thread.is_some()
    }

    /// Frames currently queued.
    pub fn queue_len(&self) -> usize {
        self.shared.queue().len()
    }

    /// Timestamp the fill thread will render next.
    pub fn next_ms(&self) -> i64 {
        self.shared.next_ms.load(Ordering::Acquire)
    }

    /// Counters for the current run.
    pub fn stats(&self) -> EngineStats {
        let s = &self.shared;
        EngineStats {
            produced: s.produced.load(Ordering::Relaxed),
            fallbacks: s.fallbacks.load(Ordering::Relaxed),
            failures: s.failures.load(Ordering::Relaxed),
            resyncs: s.resyncs.load(Ordering::Relaxed),
            served: s.served.load(Ordering::Relaxed),
            misses: s.misses.load(Ordering::Relaxed),
        }
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .field("next_ms", &self.next_ms())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn fill_loop(mut renderer: Renderer, shared: Arc<Shared>, config: EngineConfig, start_ms: i64) {
    let fps = renderer.config().fps;
    let idle = Duration::from_millis(config.idle_poll_ms);
    // Play-head moves back by no more than this are consumer jitter, not a rewind.
    let rewind_slack = config.frame_tolerance_ms.max(fps.frame_interval_ms().ceil() as i64);
    let mut next_frame = fps.frame_at_ms(start_ms);
    let mut furthest_play_head = start_ms;
    let mut exhausted = false;

    while !shared.cancelled.load(Ordering::Acquire) {
        let next_ms = fps.frame_to_ms(next_frame);
        shared.next_ms.store(next_ms, Ordering::Release);

        let play_head = shared.play_head_ms.load(Ordering::Acquire);
        let left_window = play_head.abs_diff(next_ms) > config.resync_window_ms.unsigned_abs();
        let rewound = play_head.saturating_add(rewind_slack) < furthest_play_head;
        if left_window || rewound {
            tracing::debug!(play_head, next_ms, rewound, "resyncing decode at the play-head");
            shared.queue().clear();
            shared.resyncs.fetch_add(1, Ordering::Relaxed);
            next_frame = fps.frame_at_ms(play_head.max(0));
            furthest_play_head = play_head;
            exhausted = false;
            continue;
        }
        furthest_play_head = furthest_play_head.max(play_head);

        if exhausted || next_ms - play_head > config.lookahead_ms {
            std::thread::sleep(idle);
            continue;
        }

        match renderer.render(next_ms) {
            RenderOutcome::Success(frame) => {
                shared.queue().push(frame);
                shared.produced.fetch_add(1, Ordering::Relaxed);
                next_frame += 1;
            }
            RenderOutcome::Fallback(_) => {
                shared.fallbacks.fetch_add(1, Ordering::Relaxed);
                next_frame += 1;
            }
            RenderOutcome::Failure(e) if e.kind() == ErrorKind::OutOfRange => {
                tracing::debug!(next_ms, "playback reached end of content");
                exhausted = true;
            }
            RenderOutcome::Failure(e) => {
                shared.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(next_ms, error = %e, "playback render failed");
                next_frame += 1;
            }
            RenderOutcome::Skipped => next_frame += 1,
        }
    }

    tracing::debug!(
        produced = shared.produced.load(Ordering::Relaxed),
        failures = shared.failures.load(Ordering::Relaxed),
        "fill loop exited"
    );
}

#[cfg(test)]
#[path = "../../tests/unit/playback/engine.rs"]
mod tests;
