use std::sync::Arc;

use crate::{
    foundation::core::{Canvas, Fps},
    foundation::error::PreviewResult,
    pipeline::pool::FramePool,
    timeline::model::Timeline,
};

/// Raw composited pixels produced by a [`FramePipeline`].
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub pixels: Vec<u8>,
}

/// Why a pipeline could not produce a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeFault {
    /// The requested position lies beyond decodable content.
    EndOfContent,
    /// Codec, demux or compositing failure.
    Codec(String),
}

/// Result of one pipeline step.
#[derive(Debug)]
pub enum DecodedResult {
    /// A complete frame.
    Frame(DecodedFrame),
    /// The decoder accepted the step but has no valid content yet (seek warm-up).
    Pending,
    /// The step failed.
    Error(DecodeFault),
}

/// Output format every pipeline built for a renderer must produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFormat {
    /// Output resolution.
    pub canvas: Canvas,
    /// Playback rate; one `advance` moves one frame at this rate.
    pub fps: Fps,
}

/// Stateful, non-reentrant decode + compose primitive.
///
/// A pipeline holds a read position. `seek` performs random access; `advance` moves forward by
/// exactly one frame and decodes sequentially from the current position. Callers guarantee that no
/// two calls on one instance overlap.
pub trait FramePipeline: Send {
    /// Random-access seek to `timestamp_ms`, returning the frame there if it is ready.
    fn seek(&mut self, timestamp_ms: i64) -> DecodedResult;

    /// Decode the next frame after the current position.
    fn advance(&mut self) -> DecodedResult;

    /// Drop all buffered decoder state. The next call must be a `seek`.
    fn flush(&mut self);
}

/// Builds independent [`FramePipeline`] instances over a shared timeline.
pub trait PipelineFactory: Send + Sync {
    /// Create a pipeline bound to `timeline`. Pixel storage should be drawn from `pool`.
    fn create(
        &self,
        timeline: Arc<Timeline>,
        format: OutputFormat,
        pool: FramePool,
    ) -> PreviewResult<Box<dyn FramePipeline>>;
}
