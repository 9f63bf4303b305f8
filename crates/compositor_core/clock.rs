/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use compositor_types::Clock;

/// The default `Clock`, backed by `std::time::Instant` (§4.3.9,
/// `timestamp_ms = monotonic_clock.ms()`). Passed explicitly at
/// construction rather than read from a process-wide global (§9).
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            epoch: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        MonotonicClock::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// A deterministic clock for tests: starts at zero and only advances when
/// told to, so scenario tests (§8) can assert exact `timestamp_rtp_90khz`
/// values without real-time sleeps.
#[derive(Default)]
pub struct FakeClock {
    millis: AtomicU64,
}

impl FakeClock {
    pub fn new() -> Self {
        FakeClock::default()
    }

    pub fn advance_ms(&self, delta: u64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_only_advances_when_told() {
        let clock = FakeClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.advance_ms(33);
        assert_eq!(clock.now_ms(), 33);
    }
}
