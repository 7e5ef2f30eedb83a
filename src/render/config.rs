use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::{PreviewError, PreviewResult},
    pipeline::decode::OutputFormat,
    pipeline::pool::FramePoolOpts,
};

/// Fixed-for-life settings of a [`crate::Renderer`].
///
/// Seek classification constants live here rather than in code: how far ahead a request may be
/// and still be served by sequential decode, and how many warm-up fallbacks a far seek may
/// produce before it is reported as a decode failure.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Near-seek threshold in frame intervals while scrubbing.
    pub near_seek_tolerance_frames: f64,
    /// Forward distance served by sequential decode while in playback mode.
    pub playback_forward_window_ms: i64,
    /// Warm-up fallbacks tolerated per far seek before failing with a decode error.
    pub max_warmup_attempts: u32,
    /// Treat a fully transparent frame as warm-up while a seek that returned `Pending` is still
    /// warming, instead of as content.
    pub blank_frame_is_warmup: bool,
    /// Recycling limits for this renderer's frame storage.
    pub pool: FramePoolOpts,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: Fps::default(),
            near_seek_tolerance_frames: 1.5,
            playback_forward_window_ms: 5000,
            max_warmup_attempts: 5,
            blank_frame_is_warmup: false,
            pool: FramePoolOpts::default(),
        }
    }
}

impl RendererConfig {
    /// Config with the given output size and rate and default policy constants.
    pub fn with_output(width: u32, height: u32, fps: Fps) -> Self {
        Self {
            width,
            height,
            fps,
            ..Self::default()
        }
    }

    /// Check every field.
    pub fn validate(&self) -> PreviewResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PreviewError::validation("output width/height must be > 0"));
        }
        self.fps.validate()?;
        if !self.near_seek_tolerance_frames.is_finite() || self.near_seek_tolerance_frames < 1.0 {
            return Err(PreviewError::validation(
                "near_seek_tolerance_frames must be finite and >= 1",
            ));
        }
        if self.playback_forward_window_ms < 0 {
            return Err(PreviewError::validation(
                "playback_forward_window_ms must be >= 0",
            ));
        }
        if self.max_warmup_attempts == 0 {
            return Err(PreviewError::validation("max_warmup_attempts must be >= 1"));
        }
        Ok(())
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Format handed to pipeline factories.
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat {
            canvas: self.canvas(),
            fps: self.fps,
        }
    }

    /// One frame at the configured rate, in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        self.fps.frame_interval_ms()
    }
}
