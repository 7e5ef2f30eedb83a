//! Continuous playback: a look-ahead engine with its own renderer, the frame queue it fills, and a
//! fixed-cadence clock for driving tick callbacks.

/// Fixed-cadence tick source.
pub mod clock;
/// Background look-ahead engine.
pub mod engine;
/// Bounded ring of decoded frames.
pub mod queue;
