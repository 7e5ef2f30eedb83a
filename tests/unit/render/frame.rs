use super::*;
use crate::pipeline::pool::FramePoolOpts;

#[test]
fn new_rejects_wrong_length() {
    assert!(FrameBuffer::new(2, 2, 0, vec![0; 15]).is_err());
    let f = FrameBuffer::new(2, 2, 40, vec![7; 16]).unwrap();
    assert_eq!(f.size_bytes(), 16);
    assert_eq!(f.timestamp_ms(), 40);
    assert!(!f.is_placeholder());
}

#[test]
fn placeholder_is_blank_and_sized() {
    let f = FrameBuffer::placeholder(4, 3, 100);
    assert!(f.is_placeholder());
    assert!(f.is_blank());
    assert_eq!(f.pixels().len(), 4 * 3 * 4);
}

#[test]
fn release_twice_returns_storage_once() {
    let pool = FramePool::new(FramePoolOpts::default());
    let px = pool.take(16);
    let mut f = FrameBuffer::pooled(2, 2, 0, px, pool.clone()).unwrap();
    f.release();
    f.release();
    drop(f);

    let st = pool.stats();
    assert_eq!(st.retained_buffers, 1);
    assert_eq!(st.dropped_on_release, 0);
}

#[test]
fn released_frame_refuses_copy() {
    let mut f = FrameBuffer::new(1, 1, 0, vec![1, 2, 3, 4]).unwrap();
    let mut dst = [0u8; 4];
    f.copy_to(&mut dst).unwrap();
    assert_eq!(dst, [1, 2, 3, 4]);

    f.release();
    assert!(f.is_released());
    assert!(f.copy_to(&mut dst).is_err());
}

#[test]
fn clone_is_detached_from_pool() {
    let pool = FramePool::new(FramePoolOpts::default());
    let px = pool.take(4);
    let f = FrameBuffer::pooled(1, 1, 0, px, pool.clone()).unwrap();
    let copy = f.clone();
    drop(copy);
    assert_eq!(pool.stats().retained_buffers, 0);
    drop(f);
    assert_eq!(pool.stats().retained_buffers, 1);
}

#[test]
fn content_hash_tracks_pixels() {
    let a = FrameBuffer::new(1, 1, 0, vec![1, 2, 3, 255]).unwrap();
    let b = FrameBuffer::new(1, 1, 33, vec![1, 2, 3, 255]).unwrap();
    let c = FrameBuffer::new(1, 1, 0, vec![9, 2, 3, 255]).unwrap();
    assert_eq!(a.content_hash(), b.content_hash());
    assert_ne!(a.content_hash(), c.content_hash());
}
