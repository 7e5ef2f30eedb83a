use crate::{
    foundation::error::{PreviewError, PreviewResult},
    pipeline::pool::FramePool,
};

/// A rendered frame as tightly packed, row-major RGBA8 pixels.
///
/// The receiver owns the buffer exclusively. Pixel storage that came from a renderer's
/// [`FramePool`] goes back to that pool exactly once, either through [`FrameBuffer::release`] or
/// on drop. Cloning produces a detached copy that never touches the pool.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    timestamp_ms: i64,
    pixels: Vec<u8>,
    placeholder: bool,
    recycler: Option<FramePool>,
}

impl FrameBuffer {
    /// Wrap caller-provided pixels. `pixels.len()` must equal `width * height * 4`.
    pub fn new(width: u32, height: u32, timestamp_ms: i64, pixels: Vec<u8>) -> PreviewResult<Self> {
        let expected = rgba_len(width, height);
        if pixels.len() != expected {
            return Err(PreviewError::validation(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height} RGBA",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            timestamp_ms,
            pixels,
            placeholder: false,
            recycler: None,
        })
    }

    /// Zeroed (transparent black) stand-in used while a far seek warms up.
    pub fn placeholder(width: u32, height: u32, timestamp_ms: i64) -> Self {
        Self {
            width,
            height,
            timestamp_ms,
            pixels: vec![0u8; rgba_len(width, height)],
            placeholder: true,
            recycler: None,
        }
    }

    pub(crate) fn pooled(
        width: u32,
        height: u32,
        timestamp_ms: i64,
        pixels: Vec<u8>,
        pool: FramePool,
    ) -> PreviewResult<Self> {
        let mut frame = Self::new(width, height, timestamp_ms, pixels)?;
        frame.recycler = Some(pool);
        Ok(frame)
    }

    pub(crate) fn pooled_placeholder(
        width: u32,
        height: u32,
        timestamp_ms: i64,
        pool: &FramePool,
    ) -> Self {
        Self {
            width,
            height,
            timestamp_ms,
            pixels: pool.take_zeroed(rgba_len(width, height)),
            placeholder: true,
            recycler: Some(pool.clone()),
        }
    }

    pub(crate) fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Timeline timestamp this frame was rendered for.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    /// RGBA8 bytes. Empty once released.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// `width * height * 4`.
    pub fn size_bytes(&self) -> usize {
        rgba_len(self.width, self.height)
    }

    /// `true` for seek warm-up placeholders.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// `true` when every pixel has zero alpha.
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// `true` after [`FrameBuffer::release`].
    pub fn is_released(&self) -> bool {
        self.pixels.is_empty() && self.size_bytes() != 0
    }

    /// 64-bit content fingerprint of the pixel bytes.
    pub fn content_hash(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(&self.pixels)
    }

    /// Copy pixels into a caller-managed buffer of exactly [`FrameBuffer::size_bytes`] bytes.
    pub fn copy_to(&self, dst: &mut [u8]) -> PreviewResult<()> {
        if self.is_released() {
            return Err(PreviewError::invalid_state(
                "cannot copy from a released frame buffer",
            ));
        }
        if dst.len() != self.pixels.len() {
            return Err(PreviewError::validation(format!(
                "destination has {} bytes, frame has {}",
                dst.len(),
                self.pixels.len()
            )));
        }
        dst.copy_from_slice(&self.pixels);
        Ok(())
    }

    /// Take the pixel bytes, detaching them from any pool.
    pub fn into_pixels(mut self) -> Vec<u8> {
        self.recycler = None;
        std::mem::take(&mut self.pixels)
    }

    /// Return pixel storage to its pool. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        let pixels = std::mem::take(&mut self.pixels);
        if let Some(pool) = self.recycler.take() {
            pool.release(pixels);
        }
    }
}

impl Clone for FrameBuffer {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            timestamp_ms: self.timestamp_ms,
            pixels: self.pixels.clone(),
            placeholder: self.placeholder,
            recycler: None,
        }
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("timestamp_ms", &self.timestamp_ms)
            .field("len", &self.pixels.len())
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

pub(crate) fn rgba_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
