//! Decode + compose primitives consumed by the renderer.
//!
//! A [`decode::FramePipeline`] is stateful and non-reentrant; every renderer owns its own
//! instance, built through a [`decode::PipelineFactory`].

/// Pipeline trait, factory trait and step results.
pub mod decode;
/// Recycled RGBA frame storage.
pub mod pool;
/// Procedural reference pipeline composited with `vello_cpu`.
pub mod synthetic;
