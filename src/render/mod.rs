//! Single-flight frame rendering.
//!
//! [`renderer::Renderer`] turns timestamps into frames, classifying every request as a cache hit,
//! a near seek (sequential decode) or a far seek (random access with warm-up).
//! [`gate::RenderGate`] wraps it for callers that must never block.

/// Fixed-for-life renderer settings.
pub mod config;
/// Owned RGBA frame buffers.
pub mod frame;
/// Non-blocking busy-flag wrapper.
pub mod gate;
/// Render result variants.
pub mod outcome;
/// The renderer state machine.
pub mod renderer;
/// Near/far seek classification.
pub mod seek;
