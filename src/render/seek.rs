use crate::{render::config::RendererConfig, timeline::model::ClipId};

/// Where the decode pipeline currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    /// Timestamp of the last seek or advance.
    pub timestamp_ms: i64,
    /// Frame index at that timestamp.
    pub frame: u64,
    /// Topmost clip at that timestamp.
    pub clip: Option<ClipId>,
    /// Warm-up fallbacks produced so far; `0` once content has been decoded.
    pub warmup_attempts: u32,
}

impl Cursor {
    /// `true` while a seek is still warming up.
    pub fn is_warming(&self) -> bool {
        self.warmup_attempts > 0
    }
}

/// How a render request is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekClass {
    /// Same frame as the cached one; no decode.
    CacheHit,
    /// Sequential decode continuation by `steps` frames.
    Near {
        /// Number of `advance` calls.
        steps: u64,
    },
    /// Random-access seek.
    Far,
}

/// A render request, resolved against the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeekRequest {
    /// Requested timestamp.
    pub timestamp_ms: i64,
    /// Frame index at that timestamp.
    pub frame: u64,
    /// Topmost clip at that timestamp.
    pub clip: Option<ClipId>,
}

/// Near/far seek classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeekPolicy {
    scrub_threshold_ms: f64,
    playback_window_ms: f64,
}

impl SeekPolicy {
    /// Policy constants taken from `config`.
    pub fn from_config(config: &RendererConfig) -> Self {
        let scrub_threshold_ms = config.frame_interval_ms() * config.near_seek_tolerance_frames;
        Self {
            scrub_threshold_ms,
            playback_window_ms: scrub_threshold_ms.max(config.playback_forward_window_ms as f64),
        }
    }

    /// Largest forward distance served by sequential decode.
    pub fn threshold_ms(&self, playback_mode: bool) -> f64 {
        if playback_mode {
            self.playback_window_ms
        } else {
            self.scrub_threshold_ms
        }
    }

    /// Classify `req` against the pipeline cursor and the cached frame index.
    ///
    /// Sequential decode only moves forward, so backward requests are always far seeks, as is
    /// any request whose topmost clip differs from the cursor's.
    pub fn classify(
        &self,
        req: SeekRequest,
        cursor: Option<Cursor>,
        cached_frame: Option<u64>,
        playback_mode: bool,
    ) -> SeekClass {
        let warming = cursor.is_some_and(|c| c.is_warming());
        if !warming && cached_frame == Some(req.frame) {
            return SeekClass::CacheHit;
        }

        let Some(cursor) = cursor else {
            return SeekClass::Far;
        };
        if cursor.clip != req.clip {
            return SeekClass::Far;
        }

        let delta_ms = req.timestamp_ms.saturating_sub(cursor.timestamp_ms);
        let steps = req.frame.saturating_sub(cursor.frame);
        if delta_ms > 0 && steps > 0 && (delta_ms as f64) <= self.threshold_ms(playback_mode) {
            SeekClass::Near { steps }
        } else {
            SeekClass::Far
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/seek.rs"]
mod tests;
