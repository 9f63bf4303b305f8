/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::error::CompositorError;
use crate::frame::{ComposedFrame, FrameRef, I420ABuffer};

/// A capability passed to a `FrameGenerator` at construction to resolve an
/// input index to its current frame, without the generator holding a
/// back-pointer to its owning `Compositor` (§9, "Cyclic ownership").
pub trait InputSource: Send + Sync {
    fn get_frame(&self, input: i32) -> Option<FrameRef>;
}

/// A registered output subscriber (§6). Implementations must not retain
/// `frame` beyond the call; they are expected to clone whatever they need.
pub trait Destination: Send + Sync {
    fn on_frame(&self, frame: &ComposedFrame);
}

/// An injectable monotonic clock (§9, "Global singletons in source" —
/// passed explicitly rather than referenced as a process-wide global).
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Decodes arbitrary compressed image bytes (background/overlay/avatar)
/// into an I420-with-alpha buffer. Modeled as a capability because actual
/// image decoding is an external collaborator (§1).
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<I420ABuffer, CompositorError>;
}

/// Draws the opaque text-banner spec onto a composed frame's planes
/// (§4.3.8). The `spec` string is opaque to the core; font rasterization
/// is an external collaborator (§1).
pub trait TextDrawer: Send + Sync {
    fn draw(&self, canvas: &mut crate::frame::I420Buffer, spec: &str);
}
