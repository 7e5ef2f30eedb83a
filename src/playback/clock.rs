use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::{
    foundation::core::Fps,
    foundation::error::{PreviewError, PreviewResult},
    render::outcome::OutcomeKind,
};

/// Settings for [`PlaybackClock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClockOpts {
    /// Tick rate.
    pub fps: Fps,
    /// Worker threads executing tick callbacks. `None` uses the rayon default.
    pub threads: Option<usize>,
}

impl Default for ClockOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            threads: Some(2),
        }
    }
}

/// Outcome tally of one [`PlaybackClock::drive`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ClockReport {
    /// Ticks fired.
    pub ticks: u64,
    /// Ticks that returned `Success`.
    pub success: u64,
    /// Ticks that returned `Fallback`.
    pub fallback: u64,
    /// Ticks that returned `Skipped`.
    pub skipped: u64,
    /// Ticks that returned `Failure`.
    pub failure: u64,
}

#[derive(Default)]
struct Tally {
    success: AtomicU64,
    fallback: AtomicU64,
    skipped: AtomicU64,
    failure: AtomicU64,
}

impl Tally {
    fn record(&self, kind: OutcomeKind) {
        let counter = match kind {
            OutcomeKind::Success => &self.success,
            OutcomeKind::Fallback => &self.fallback,
            OutcomeKind::Skipped => &self.skipped,
            OutcomeKind::Failure => &self.failure,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fixed-cadence tick source modelled on a display refresh callback.
///
/// The calling thread keeps the schedule and hands each tick to a worker of a private rayon pool,
/// so a slow callback overlaps the next tick instead of delaying it.
pub struct PlaybackClock {
    opts: ClockOpts,
    pool: rayon::ThreadPool,
}

impl PlaybackClock {
    /// Build the worker pool.
    pub fn new(opts: ClockOpts) -> PreviewResult<Self> {
        opts.fps.validate()?;
        Ok(Self {
            pool: build_thread_pool(opts.threads)?,
            opts,
        })
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.opts.fps.frame_interval_ms() / 1000.0)
    }

    /// Fire `ticks` ticks starting at timeline position `start_ms`, calling `on_tick` with the
    /// timestamp of each, and return once every tick has completed.
    pub fn drive<F>(&self, start_ms: i64, ticks: u64, on_tick: F) -> ClockReport
    where
        F: Fn(i64) -> OutcomeKind + Sync,
    {
        let tally = Tally::default();
        let interval = self.interval();
        let fps = self.opts.fps;
        let first_frame = fps.frame_at_ms(start_ms);
        let origin = Instant::now();

        self.pool.in_place_scope(|s| {
            for i in 0..ticks {
                let deadline = origin + interval.mul_f64(i as f64);
                if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                    std::thread::sleep(wait);
                }
                let ts = fps.frame_to_ms(first_frame + i);
                let tally = &tally;
                let on_tick = &on_tick;
                s.spawn(move |_| tally.record(on_tick(ts)));
            }
        });

        let report = ClockReport {
            ticks,
            success: tally.success.into_inner(),
            fallback: tally.fallback.into_inner(),
            skipped: tally.skipped.into_inner(),
            failure: tally.failure.into_inner(),
        };
        tracing::debug!(
            ?report,
            elapsed_ms = origin.elapsed().as_millis() as u64,
            "clock run finished"
        );
        report
    }
}

impl std::fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("opts", &self.opts)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

fn build_thread_pool(threads: Option<usize>) -> PreviewResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PreviewError::validation("clock 'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("wavyte-preview-tick-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
