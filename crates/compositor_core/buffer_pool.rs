/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::{Arc, Weak};

use compositor_types::I420Buffer;

/// Bounds the number of concurrently outstanding buffers a caller may hand
/// out (an `InputSlot`'s per-slot pool, or a `FrameGenerator`'s canvas
/// pool). `acquire` always allocates a fresh buffer, but refuses once
/// `capacity` previously-handed-out buffers are still alive, which is the
/// "no-free-buffer" exhaustion case of §4.1/§7 (`ResourceExhausted`).
///
/// This trades literal byte-buffer reuse (which would need `unsafe` or a
/// pooling allocator) for a safe bounded-concurrency guarantee with the
/// same externally observable behavior: once all tracked buffers are
/// dropped, the pool accepts new acquisitions again.
///
/// `acquire` takes a `fill` callback and populates the buffer *before*
/// wrapping it in an `Arc`, rather than handing back a bare `Arc` for the
/// caller to mutate through `Arc::get_mut`: once this pool's `Weak` is
/// registered against an allocation, `Arc::get_mut` can never succeed for
/// it again (`get_mut` requires zero outstanding `Weak`s, not just a
/// strong count of one), so mutation has to happen while the buffer is
/// still uniquely owned and bare.
pub struct FramePool {
    capacity: usize,
    tracked: Vec<Weak<I420Buffer>>,
}

impl FramePool {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "a frame pool must hold at least one buffer");
        FramePool {
            capacity,
            tracked: Vec::with_capacity(capacity),
        }
    }

    /// Acquire a zeroed buffer of the given size, let `fill` populate it,
    /// then publish it as a tracked `Arc`. Returns `None` without calling
    /// `fill` if `capacity` buffers handed out earlier are all still alive.
    pub fn acquire(
        &mut self,
        width: u32,
        height: u32,
        fill: impl FnOnce(&mut I420Buffer),
    ) -> Option<Arc<I420Buffer>> {
        self.tracked.retain(|weak| weak.strong_count() > 0);
        if self.tracked.len() >= self.capacity {
            return None;
        }
        let mut buf = I420Buffer::zeroed(width, height);
        fill(&mut buf);
        let arc = Arc::new(buf);
        self.tracked.push(Arc::downgrade(&arc));
        Some(arc)
    }

    pub fn live_count(&mut self) -> usize {
        self.tracked.retain(|weak| weak.strong_count() > 0);
        self.tracked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_up_to_capacity() {
        let mut pool = FramePool::new(2);
        let a = pool.acquire(4, 4, |_| {}).unwrap();
        let b = pool.acquire(4, 4, |_| {}).unwrap();
        assert!(pool.acquire(4, 4, |_| {}).is_none());
        drop(a);
        assert!(pool.acquire(4, 4, |_| {}).is_some());
        drop(b);
    }

    #[test]
    fn dropping_a_buffer_frees_capacity() {
        let mut pool = FramePool::new(1);
        let a = pool.acquire(2, 2, |_| {}).unwrap();
        assert!(pool.acquire(2, 2, |_| {}).is_none());
        drop(a);
        assert_eq!(pool.live_count(), 0);
        assert!(pool.acquire(2, 2, |_| {}).is_some());
    }

    #[test]
    fn fill_callback_populates_before_publish() {
        let mut pool = FramePool::new(1);
        let buf = pool
            .acquire(2, 2, |buf| buf.y.fill(77))
            .unwrap();
        assert!(buf.y.iter().all(|&v| v == 77));
    }
}
