use std::sync::{Arc, Mutex, PoisonError};

/// Pool configuration for recycled frame buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FramePoolOpts {
    /// Maximum bytes retained across all idle buffers.
    pub max_pool_bytes: usize,
    /// Maximum number of idle buffers retained.
    pub max_buffers: usize,
}

impl Default for FramePoolOpts {
    fn default() -> Self {
        Self {
            // Enough for a handful of 1080p RGBA frames.
            max_pool_bytes: 64 * 1024 * 1024,
            max_buffers: 6,
        }
    }
}

/// Allocation counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FramePoolStats {
    /// Idle buffers currently retained.
    pub retained_buffers: usize,
    /// Bytes held by idle buffers.
    pub retained_bytes: usize,
    /// Fresh allocations made because no idle buffer fit.
    pub alloc_buffers: u64,
    /// Buffers handed out from the idle list.
    pub reused_buffers: u64,
    /// Buffers dropped on release because a cap was hit.
    pub dropped_on_release: u64,
}

struct PoolState {
    opts: FramePoolOpts,
    stats: FramePoolStats,
    idle: Vec<Vec<u8>>,
}

/// Bounded recycler for RGBA pixel storage.
///
/// Cloning yields another handle to the same pool. Each renderer owns exactly one pool; buffers
/// handed to callers return to it when the owning [`crate::FrameBuffer`] is released or dropped.
#[derive(Clone)]
pub struct FramePool {
    state: Arc<Mutex<PoolState>>,
}

impl FramePool {
    /// Create an empty pool.
    pub fn new(opts: FramePoolOpts) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoolState {
                opts,
                stats: FramePoolStats::default(),
                idle: Vec::new(),
            })),
        }
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> FramePoolStats {
        self.lock().stats
    }

    /// Borrow a buffer of exactly `len` bytes. Contents are unspecified.
    pub fn take(&self, len: usize) -> Vec<u8> {
        let mut st = self.lock();
        if let Some(i) = st.idle.iter().position(|b| b.len() == len) {
            let buf = st.idle.swap_remove(i);
            st.stats.retained_buffers = st.stats.retained_buffers.saturating_sub(1);
            st.stats.retained_bytes = st.stats.retained_bytes.saturating_sub(len);
            st.stats.reused_buffers = st.stats.reused_buffers.saturating_add(1);
            return buf;
        }
        st.stats.alloc_buffers = st.stats.alloc_buffers.saturating_add(1);
        drop(st);
        vec![0u8; len]
    }

    /// Borrow a zero-filled buffer of `len` bytes.
    pub fn take_zeroed(&self, len: usize) -> Vec<u8> {
        let mut buf = self.take(len);
        buf.fill(0);
        buf
    }

    /// Return a buffer to the idle list, or drop it when a cap is hit.
    pub fn release(&self, buf: Vec<u8>) {
        let bytes = buf.len();
        let mut st = self.lock();
        if bytes == 0
            || st.opts.max_buffers == 0
            || st.idle.len() >= st.opts.max_buffers
            || st.stats.retained_bytes.saturating_add(bytes) > st.opts.max_pool_bytes
        {
            st.stats.dropped_on_release = st.stats.dropped_on_release.saturating_add(1);
            return;
        }
        st.idle.push(buf);
        st.stats.retained_buffers = st.stats.retained_buffers.saturating_add(1);
        st.stats.retained_bytes = st.stats.retained_bytes.saturating_add(bytes);
    }

    /// Drop every idle buffer.
    pub fn clear(&self) {
        let mut st = self.lock();
        st.idle.clear();
        st.stats.retained_buffers = 0;
        st.stats.retained_bytes = 0;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FramePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePool")
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/pool.rs"]
mod tests;
