use std::sync::Arc;

use crate::{
    foundation::error::{PreviewError, PreviewResult},
    pipeline::decode::{DecodeFault, DecodedResult, FramePipeline, PipelineFactory},
    pipeline::pool::FramePool,
    render::config::RendererConfig,
    render::frame::{FrameBuffer, rgba_len},
    render::outcome::RenderOutcome,
    render::seek::{Cursor, SeekClass, SeekPolicy, SeekRequest},
    timeline::model::{ClipId, Timeline},
};

/// Per-renderer counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RendererStats {
    /// Calls to [`Renderer::render`].
    pub renders: u64,
    /// `Success` outcomes, cache hits included.
    pub successes: u64,
    /// Requests served from the last-rendered cache.
    pub cache_hits: u64,
    /// Requests served by sequential decode.
    pub near_seeks: u64,
    /// Requests that needed a random-access seek.
    pub far_seeks: u64,
    /// Warm-up placeholders returned.
    pub fallbacks: u64,
    /// `Failure` outcomes.
    pub failures: u64,
}

struct CachedFrame {
    frame_index: u64,
    clip: Option<ClipId>,
    frame: FrameBuffer,
}

/// Single-flight decode + compose state machine with a one-frame cache.
///
/// A renderer owns exactly one pipeline, one frame pool and one cache slot; two renderers built
/// over the same timeline share nothing but the read-only timeline. `render` takes `&mut self`, so
/// concurrent use goes through [`crate::RenderGate`].
pub struct Renderer {
    timeline: Arc<Timeline>,
    config: RendererConfig,
    policy: SeekPolicy,
    pool: FramePool,
    pipeline: Option<Box<dyn FramePipeline>>,
    last_rendered: Option<CachedFrame>,
    cursor: Option<Cursor>,
    playback_mode: bool,
    stats: RendererStats,
}

impl Renderer {
    /// Validate inputs and create the decode pipeline.
    pub fn new(
        timeline: Arc<Timeline>,
        config: RendererConfig,
        factory: &dyn PipelineFactory,
    ) -> PreviewResult<Self> {
        config.validate()?;
        timeline.validate()?;

        let pool = FramePool::new(config.pool);
        let pipeline = factory.create(timeline.clone(), config.output_format(), pool.clone())?;
        tracing::debug!(
            width = config.width,
            height = config.height,
            fps = config.fps.as_f64(),
            end_ms = timeline.end_ms(),
            "renderer created"
        );

        Ok(Self {
            policy: SeekPolicy::from_config(&config),
            timeline,
            config,
            pool,
            pipeline: Some(pipeline),
            last_rendered: None,
            cursor: None,
            playback_mode: false,
            stats: RendererStats::default(),
        })
    }

    /// Configuration this renderer was built with.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// One frame at the configured rate, in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        self.config.frame_interval_ms()
    }

    /// Counters since construction.
    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Whether playback mode is on.
    pub fn playback_mode(&self) -> bool {
        self.playback_mode
    }

    /// `true` after [`Renderer::destroy`].
    pub fn is_destroyed(&self) -> bool {
        self.pipeline.is_none()
    }

    fn cached_timestamp_ms(&self) -> Option<i64> {
        self.last_rendered.as_ref().map(|c| c.frame.timestamp_ms())
    }

    /// Render the frame at `timestamp_ms`.
    ///
    /// `Fallback` means a far seek has not produced content yet; the caller should ask again at
    /// `timestamp_ms + frame_interval_ms()`, which continues the seek sequentially.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn render(&mut self, timestamp_ms: i64) -> RenderOutcome {
        self.stats.renders += 1;
        let outcome = self.render_inner(timestamp_ms);
        match &outcome {
            RenderOutcome::Success(_) => self.stats.successes += 1,
            RenderOutcome::Fallback(_) => self.stats.fallbacks += 1,
            RenderOutcome::Failure(e) => {
                self.stats.failures += 1;
                tracing::debug!(timestamp_ms, error = %e, "render failed");
            }
            RenderOutcome::Skipped => {}
        }
        outcome
    }

    /// Switch between scrub and playback seek policy.
    ///
    /// Discards the cached frame and flushes the pipeline, so the next render always decodes.
    pub fn set_playback_mode(&mut self, enabled: bool) {
        self.playback_mode = enabled;
        self.flush();
        tracing::debug!(enabled, "playback mode set");
    }

    /// Discard the cached frame and all buffered decoder state.
    pub fn flush(&mut self) {
        self.invalidate();
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.flush();
        }
    }

    /// Release the pipeline, the cached frame and idle pool storage.
    ///
    /// Idempotent. Later renders fail with `InvalidState`.
    pub fn destroy(&mut self) {
        if self.pipeline.take().is_some() {
            tracing::debug!("renderer destroyed");
        }
        self.invalidate();
        self.pool.clear();
    }

    fn render_inner(&mut self, timestamp_ms: i64) -> RenderOutcome {
        if self.pipeline.is_none() {
            return RenderOutcome::Failure(PreviewError::invalid_state(
                "renderer has been destroyed",
            ));
        }

        let last_ms = self
            .timeline
            .end_ms()
            .saturating_add(self.frame_interval_ms().ceil() as i64);
        if timestamp_ms < 0 || timestamp_ms > last_ms {
            return RenderOutcome::Failure(PreviewError::out_of_range(format!(
                "{timestamp_ms}ms is outside [0, {last_ms}]ms"
            )));
        }

        let req = SeekRequest {
            timestamp_ms,
            frame: self.config.fps.frame_at_ms(timestamp_ms),
            clip: self.timeline.top_clip_at(timestamp_ms).map(|c| c.id),
        };
        let cached_frame = self.last_rendered.as_ref().map(|c| c.frame_index);

        match self
            .policy
            .classify(req, self.cursor, cached_frame, self.playback_mode)
        {
            SeekClass::CacheHit => self.serve_cached(req),
            SeekClass::Near { steps } => self.decode_forward(req, steps),
            SeekClass::Far => self.decode_seek(req),
        }
    }

    fn serve_cached(&mut self, req: SeekRequest) -> RenderOutcome {
        match self.last_rendered.as_ref() {
            Some(c) if c.clip == req.clip => {
                self.stats.cache_hits += 1;
                RenderOutcome::Success(c.frame.clone().with_timestamp(req.timestamp_ms))
            }
            _ => self.decode_seek(req),
        }
    }

    fn decode_forward(&mut self, req: SeekRequest, steps: u64) -> RenderOutcome {
        self.stats.near_seeks += 1;
        let attempts = match self.cursor {
            Some(c) if c.is_warming() => c.warmup_attempts + 1,
            _ => 1,
        };
        tracing::trace!(ts = req.timestamp_ms, steps, "near seek");

        let Some(pipeline) = self.pipeline.as_mut() else {
            return RenderOutcome::Failure(PreviewError::invalid_state(
                "renderer has been destroyed",
            ));
        };
        let mut result = DecodedResult::Pending;
        for step in 0..steps {
            result = match pipeline.advance() {
                // Intermediate frames are only decoded to move the pipeline forward.
                DecodedResult::Frame(f) if step + 1 < steps => {
                    self.pool.release(f.pixels);
                    DecodedResult::Pending
                }
                other => other,
            };
            if matches!(result, DecodedResult::Error(_)) {
                break;
            }
        }
        self.settle(req, result, attempts)
    }

    fn decode_seek(&mut self, req: SeekRequest) -> RenderOutcome {
        self.stats.far_seeks += 1;
        let attempts = match self.cursor {
            Some(c) if c.is_warming() && c.frame == req.frame => c.warmup_attempts + 1,
            _ => 1,
        };
        tracing::debug!(
            ts = req.timestamp_ms,
            from_ms = self.cursor.map(|c| c.timestamp_ms),
            "far seek"
        );

        let Some(pipeline) = self.pipeline.as_mut() else {
            return RenderOutcome::Failure(PreviewError::invalid_state(
                "renderer has been destroyed",
            ));
        };
        let result = pipeline.seek(req.timestamp_ms);
        self.settle(req, result, attempts)
    }

    fn settle(&mut self, req: SeekRequest, result: DecodedResult, attempts: u32) -> RenderOutcome {
        let decoded = match result {
            DecodedResult::Frame(decoded) => decoded,
            DecodedResult::Pending => return self.warm_up(req, attempts),
            DecodedResult::Error(DecodeFault::EndOfContent) => {
                self.invalidate();
                return RenderOutcome::Failure(PreviewError::out_of_range(format!(
                    "no decodable content at {}ms",
                    req.timestamp_ms
                )));
            }
            DecodedResult::Error(DecodeFault::Codec(msg)) => {
                self.invalidate();
                return RenderOutcome::Failure(PreviewError::decode(msg));
            }
        };

        if decoded.width != self.config.width
            || decoded.height != self.config.height
            || decoded.pixels.len() != rgba_len(self.config.width, self.config.height)
        {
            let msg = format!(
                "pipeline produced {}x{} ({} bytes), expected {}x{}",
                decoded.width,
                decoded.height,
                decoded.pixels.len(),
                self.config.width,
                self.config.height
            );
            self.pool.release(decoded.pixels);
            self.invalidate();
            return RenderOutcome::Failure(PreviewError::decode(msg));
        }

        let frame = match FrameBuffer::pooled(
            decoded.width,
            decoded.height,
            req.timestamp_ms,
            decoded.pixels,
            self.pool.clone(),
        ) {
            Ok(f) => f,
            Err(e) => {
                self.invalidate();
                return RenderOutcome::Failure(e);
            }
        };

        // `attempts > 1` only while continuing a seek that already reported `Pending`. A blank
        // frame past the budget is real content.
        if self.config.blank_frame_is_warmup
            && attempts > 1
            && attempts <= self.config.max_warmup_attempts
            && frame.is_blank()
        {
            drop(frame);
            return self.warm_up(req, attempts);
        }

        self.cursor = Some(Cursor {
            timestamp_ms: req.timestamp_ms,
            frame: req.frame,
            clip: req.clip,
            warmup_attempts: 0,
        });
        self.last_rendered = Some(CachedFrame {
            frame_index: req.frame,
            clip: req.clip,
            frame: frame.clone(),
        });
        RenderOutcome::Success(frame)
    }

    fn warm_up(&mut self, req: SeekRequest, attempts: u32) -> RenderOutcome {
        if attempts > self.config.max_warmup_attempts {
            tracing::warn!(
                ts = req.timestamp_ms,
                attempts,
                "seek produced no content within the warm-up budget"
            );
            self.invalidate();
            return RenderOutcome::Failure(PreviewError::decode(format!(
                "seek to {}ms produced no content after {} attempts",
                req.timestamp_ms,
                attempts - 1
            )));
        }

        self.cursor = Some(Cursor {
            timestamp_ms: req.timestamp_ms,
            frame: req.frame,
            clip: req.clip,
            warmup_attempts: attempts,
        });
        RenderOutcome::Fallback(FrameBuffer::pooled_placeholder(
            self.config.width,
            self.config.height,
            req.timestamp_ms,
            &self.pool,
        ))
    }

    fn invalidate(&mut self) {
        self.last_rendered = None;
        self.cursor = None;
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("playback_mode", &self.playback_mode)
            .field("destroyed", &self.is_destroyed())
            .field("cursor", &self.cursor)
            .field("cached_ms", &self.cached_timestamp_ms())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
