//! Real-time preview rendering for timeline-based video editing.
//!
//! The crate turns a timeline position into a composited RGBA frame under three usage patterns:
//!
//! - Scrubbing: [`Renderer::render`] serves random-access requests, classifying each as a cache
//!   hit, a near seek (sequential decode) or a far seek (random access with a warm-up
//!   [`RenderOutcome::Fallback`]).
//! - Display-refresh ticks: [`RenderGate::try_render`] never blocks and returns
//!   [`RenderOutcome::Skipped`] while a render is in flight.
//! - Continuous playback: [`PlaybackEngine`] decodes ahead of the play-head on its own thread with
//!   its own renderer, and [`PlaybackEngine::try_get_frame`] hands out queued frames.
//!
//! Decoding and compositing sit behind [`FramePipeline`]; [`SyntheticFactory`] provides a
//! procedural reference pipeline.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Decode + compose primitives.
pub mod pipeline;
/// Continuous playback.
pub mod playback;
/// Single-flight rendering.
pub mod render;
/// Timeline model.
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps};
pub use crate::foundation::error::{ErrorKind, PreviewError, PreviewResult};

pub use crate::pipeline::decode::{
    DecodeFault, DecodedFrame, DecodedResult, FramePipeline, OutputFormat, PipelineFactory,
};
pub use crate::pipeline::pool::{FramePool, FramePoolOpts, FramePoolStats};
pub use crate::pipeline::synthetic::{SyntheticFactory, SyntheticOpts, SyntheticPipeline};
pub use crate::playback::clock::{ClockOpts, ClockReport, PlaybackClock};
pub use crate::playback::engine::{EngineConfig, EngineStats, PlaybackEngine};
pub use crate::playback::queue::FrameQueue;
pub use crate::render::config::RendererConfig;
pub use crate::render::frame::FrameBuffer;
pub use crate::render::gate::{GateStats, RenderGate};
pub use crate::render::outcome::{OutcomeKind, RenderOutcome};
pub use crate::render::renderer::{Renderer, RendererStats};
pub use crate::render::seek::{Cursor, SeekClass, SeekPolicy, SeekRequest};
pub use crate::timeline::model::{Clip, ClipId, ClipSource, Timeline, Track};
