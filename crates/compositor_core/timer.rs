/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, bounded};

/// Drives a `FrameGenerator`'s fixed-cadence render loop on a dedicated
/// thread (§4.3.10, §5 "Timer thread"). Adapted from the teacher's
/// `RefreshDriver`/`TimerThread` pair: a background thread plus a shutdown
/// channel that `Drop` uses to stop and join it, but reworked from
/// one-shot/animation-driven scheduling to an unconditional fixed-period
/// tick, since the generator — unlike a browser compositor — always has
/// work to consider on every tick (even if no bucket ends up due).
pub(crate) struct TickClock {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TickClock {
    /// Spawns the timer thread immediately; construction is "enter Running"
    /// (§4.3.10).
    pub fn start(period: Duration, mut on_tick: impl FnMut() + Send + 'static) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let handle = thread::Builder::new()
            .name(String::from("CompositorTickClock"))
            .spawn(move || {
                let mut deadline = Instant::now() + period;
                loop {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Ok(()) => return,
                        Err(crossbeam_channel::RecvTimeoutError::Disconnected) => return,
                        Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
                    }
                    deadline += period;
                    on_tick();
                }
            })
            .expect("could not spawn compositor tick clock thread");

        TickClock {
            stop_tx,
            handle: Some(handle),
        }
    }
}

/// Entering `Stopping`: signal the thread, wait for the in-flight tick (if
/// any) to return, then join (§4.3.10, "waits for the current tick callback
/// to return").
impl Drop for TickClock {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
