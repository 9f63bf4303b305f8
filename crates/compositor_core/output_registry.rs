/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use compositor_types::Destination;
use parking_lot::RwLock;

type BucketEntry = (Arc<dyn Destination>, u32, u32);

/// A bucketed list of output subscribers indexed by the integer divisor
/// `k = maxFps/fps - 1` (§4.4). Buckets are independently lock-protected so
/// a slow subscriber in one bucket cannot stall delivery to another.
pub(crate) struct OutputRegistry {
    max_fps: u32,
    canvas_width: u32,
    canvas_height: u32,
    buckets: Vec<RwLock<Vec<BucketEntry>>>,
}

impl OutputRegistry {
    pub fn new(max_fps: u32, min_fps: u32, canvas_width: u32, canvas_height: u32) -> Self {
        let ladder_len = (max_fps / min_fps).max(1) as usize;
        OutputRegistry {
            max_fps,
            canvas_width,
            canvas_height,
            buckets: (0..ladder_len).map(|_| RwLock::new(Vec::new())).collect(),
        }
    }

    /// True iff `fps` lies on the power-of-two ladder and `(width, height)`
    /// equal the canvas size (§4.3, `isSupported`).
    pub fn is_supported(&self, width: u32, height: u32, fps: u32) -> bool {
        width == self.canvas_width
            && height == self.canvas_height
            && fps > 0
            && self.max_fps % fps == 0
            && (self.max_fps / fps).is_power_of_two()
            && ((self.max_fps / fps) as usize) <= self.buckets.len()
    }

    pub fn add(
        &self,
        width: u32,
        height: u32,
        fps: u32,
        destination: Arc<dyn Destination>,
    ) -> bool {
        if !self.is_supported(width, height, fps) {
            return false;
        }
        let index = (self.max_fps / fps - 1) as usize;
        self.buckets[index].write().push((destination, width, height));
        true
    }

    /// Scans all buckets linearly, removing the first match by pointer
    /// identity (§4.4, `remove(dst)`).
    pub fn remove(&self, destination: &Arc<dyn Destination>) -> bool {
        for bucket in &self.buckets {
            let mut entries = bucket.write();
            if let Some(pos) = entries
                .iter()
                .position(|(dst, _, _)| Arc::ptr_eq(dst, destination))
            {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    /// True iff any bucket is due on this tick (§4.3.1: "we compose one
    /// frame per tick whenever ANY bucket is due").
    pub fn any_due(&self, tick: u64) -> bool {
        self.buckets.iter().enumerate().any(|(i, bucket)| {
            let divisor = (i + 1) as u64;
            tick % divisor == 0 && !bucket.read().is_empty()
        })
    }

    /// Invokes `deliver` once per due, non-empty bucket, holding only that
    /// bucket's read lock for the call.
    pub fn for_each_due_bucket(&self, tick: u64, mut deliver: impl FnMut(&[BucketEntry])) {
        for (i, bucket) in self.buckets.iter().enumerate() {
            let divisor = (i + 1) as u64;
            if tick % divisor != 0 {
                continue;
            }
            let entries = bucket.read();
            if !entries.is_empty() {
                deliver(&entries);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compositor_types::ComposedFrame;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingDestination(AtomicUsize);

    impl Destination for CountingDestination {
        fn on_frame(&self, _frame: &ComposedFrame) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn rejects_non_ladder_fps_and_wrong_size() {
        let registry = OutputRegistry::new(60, 15, 640, 360);
        let dst: Arc<dyn Destination> = Arc::new(CountingDestination(AtomicUsize::new(0)));
        assert!(!registry.add(640, 360, 20, dst.clone()));
        assert!(!registry.add(1280, 720, 30, dst));
    }

    #[test]
    fn fanout_matches_scenario_s4_bucket_schedule() {
        let registry = OutputRegistry::new(60, 15, 640, 360);
        let d60: Arc<dyn Destination> = Arc::new(CountingDestination(AtomicUsize::new(0)));
        let d30: Arc<dyn Destination> = Arc::new(CountingDestination(AtomicUsize::new(0)));
        let d15: Arc<dyn Destination> = Arc::new(CountingDestination(AtomicUsize::new(0)));
        assert!(registry.add(640, 360, 60, d60.clone()));
        assert!(registry.add(640, 360, 30, d30.clone()));
        assert!(registry.add(640, 360, 15, d15.clone()));

        let mut counts = [0usize; 3];
        for tick in 0..60u64 {
            registry.for_each_due_bucket(tick, |entries| {
                for (dst, _, _) in entries {
                    if Arc::ptr_eq(dst, &d60) {
                        counts[0] += 1;
                    } else if Arc::ptr_eq(dst, &d30) {
                        counts[1] += 1;
                    } else if Arc::ptr_eq(dst, &d15) {
                        counts[2] += 1;
                    }
                }
            });
        }
        assert_eq!(counts, [60, 30, 15]);
    }

    #[test]
    fn remove_finds_first_match_across_buckets() {
        let registry = OutputRegistry::new(60, 15, 640, 360);
        let dst: Arc<dyn Destination> = Arc::new(CountingDestination(AtomicUsize::new(0)));
        assert!(registry.add(640, 360, 30, dst.clone()));
        assert!(registry.remove(&dst));
        assert!(!registry.remove(&dst));
    }
}
