/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use compositor_types::{FrameRef, I420Buffer};
use log::error;
use parking_lot::Mutex;

use crate::buffer_pool::FramePool;

const SLOT_POOL_CAPACITY: usize = 3;

struct SlotState {
    active: bool,
    connected: bool,
    busy: Option<FrameRef>,
    pool: FramePool,
}

/// A per-input single-frame mailbox with lossy overwrite semantics (§4.1).
/// Producers publish whole buffers; consumers read a reference-counted
/// handle under a short critical section.
pub struct InputSlot {
    index: i32,
    state: Mutex<SlotState>,
}

impl InputSlot {
    pub fn new(index: i32) -> Self {
        InputSlot {
            index,
            state: Mutex::new(SlotState {
                active: true,
                connected: true,
                busy: None,
                pool: FramePool::new(SLOT_POOL_CAPACITY),
            }),
        }
    }

    pub fn set_active(&self, active: bool) {
        let mut state = self.state.lock();
        state.active = active;
        if !active {
            state.busy = None;
        }
    }

    pub fn set_connected(&self, connected: bool) {
        let mut state = self.state.lock();
        state.connected = connected;
        if !connected {
            state.busy = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Producer path: copy `frame` into a pooled buffer and publish it as
    /// the slot's current frame. Drops silently (logged) if inactive or if
    /// the slot's buffer pool is exhausted (§7, ResourceExhausted).
    pub fn push(&self, frame: &I420Buffer) {
        let mut state = self.state.lock();
        if !state.active {
            return;
        }
        let acquired = state.pool.acquire(frame.width, frame.height, |storage| {
            storage.y.copy_from_slice(&frame.y);
            storage.u.copy_from_slice(&frame.u);
            storage.v.copy_from_slice(&frame.v);
        });
        match acquired {
            Some(buf) => {
                state.busy = Some(buf);
            }
            None => {
                error!(
                    "input slot {}: buffer pool exhausted, dropping pushed frame",
                    self.index
                );
            }
        }
    }

    /// Consumer path: returns a handle to the current busy frame, or
    /// `None` if inactive. The handle outlives this call.
    pub fn pop(&self) -> Option<FrameRef> {
        let state = self.state.lock();
        if !state.active {
            return None;
        }
        state.busy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, fill: u8) -> I420Buffer {
        I420Buffer::filled(width, height, fill, 128, 128)
    }

    #[test]
    fn pop_returns_the_latest_push() {
        let slot = InputSlot::new(0);
        slot.push(&frame(4, 4, 10));
        slot.push(&frame(4, 4, 20));
        slot.push(&frame(4, 4, 30));
        let latest = slot.pop().expect("slot has a frame");
        assert!(latest.y.iter().all(|&v| v == 30));
    }

    #[test]
    fn deactivation_drops_the_retained_frame() {
        let slot = InputSlot::new(0);
        slot.push(&frame(4, 4, 5));
        assert!(slot.pop().is_some());
        slot.set_active(false);
        assert!(slot.pop().is_none());
    }

    #[test]
    fn disconnection_drops_the_retained_frame() {
        let slot = InputSlot::new(0);
        slot.push(&frame(4, 4, 5));
        slot.set_connected(false);
        assert!(slot.pop().is_none());
    }

    #[test]
    fn pool_exhaustion_drops_the_push_without_panicking() {
        let slot = InputSlot::new(0);
        // Hold three live references concurrently, exhausting the pool
        // (capacity 3), then push a fourth frame: it must be dropped, not
        // panic or block.
        let refs: Vec<_> = (0..3)
            .map(|i| {
                slot.push(&frame(4, 4, i));
                slot.pop().unwrap()
            })
            .collect();
        slot.push(&frame(4, 4, 99));
        // The push was dropped: pop returns the last held value, not 99,
        // because the pool had no free slot to copy into.
        let after = slot.pop().expect("slot still has its previous frame");
        assert!(after.y.iter().all(|&v| v != 99));
        drop(refs);
    }
}
