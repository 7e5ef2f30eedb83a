use std::collections::VecDeque;

use crate::render::frame::FrameBuffer;

/// Default number of frames the playback engine keeps decoded ahead.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Bounded ring of decoded frames ordered by insertion.
///
/// Pushing into a full queue evicts the oldest frame; evicted frames return their storage to the
/// renderer pool on drop.
#[derive(Debug)]
pub struct FrameQueue {
    frames: VecDeque<FrameBuffer>,
    capacity: usize,
}

impl FrameQueue {
    /// Empty queue holding at most `capacity` frames (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `frame`, evicting the oldest frames while full.
    pub fn push(&mut self, frame: FrameBuffer) {
        while self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Copy of the frame closest to `timestamp_ms`, if one lies within `tolerance_ms`.
    ///
    /// The frame stays queued. On a tie the older frame wins.
    pub fn peek_nearest(&self, timestamp_ms: i64, tolerance_ms: i64) -> Option<FrameBuffer> {
        let mut best: Option<(i64, usize)> = None;
        for (i, f) in self.frames.iter().enumerate() {
            let diff = f.timestamp_ms().abs_diff(timestamp_ms);
            let diff = i64::try_from(diff).unwrap_or(i64::MAX);
            if diff <= tolerance_ms && best.is_none_or(|(d, _)| diff < d) {
                best = Some((diff, i));
            }
        }
        best.map(|(_, i)| self.frames[i].clone())
    }

    /// Drop every queued frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of queued frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Maximum number of queued frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/queue.rs"]
mod tests;
