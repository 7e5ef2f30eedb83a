use crate::foundation::error::{PreviewError, PreviewResult};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PreviewResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    /// Check `num > 0` and `den > 0`.
    pub fn validate(self) -> PreviewResult<()> {
        if self.den == 0 {
            return Err(PreviewError::validation("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(PreviewError::validation("Fps num must be > 0"));
        }
        Ok(())
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_interval_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Nearest frame index for a timeline timestamp. Negative timestamps clamp to frame 0.
    pub fn frame_at_ms(self, timestamp_ms: i64) -> u64 {
        let frames = (timestamp_ms as f64) / self.frame_interval_ms();
        frames.round().max(0.0) as u64
    }

    /// Timestamp of the start of `frame`, rounded to whole milliseconds.
    pub fn frame_to_ms(self, frame: u64) -> i64 {
        ((frame as f64) * self.frame_interval_ms()).round() as i64
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Byte length of a tightly packed RGBA8 frame of this size.
    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
