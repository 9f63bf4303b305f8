/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The clocked, multi-threaded engine of the video compositor: per-input
//! mailboxes, avatar fallback, tweened layout, fps-bucketed fanout, and the
//! top-level `Compositor` facade that ties them together.

mod avatar_store;
mod buffer_pool;
mod clock;
mod compositor;
mod frame_generator;
mod input_slot;
mod output_registry;
mod timer;
mod tween;

pub use clock::{FakeClock, MonotonicClock};
pub use compositor::Compositor;
pub use frame_generator::FrameGenerator;
