/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! I420/I420A raster primitives: rect/even-pixel math, box-filter plane
//! scaling, alpha blending, aspect-fit-cover background compositing, and
//! the default `ImageDecoder` implementation.
//!
//! Modeled as its own crate because §1 frames the raster primitives
//! library as a separate collaborator from the frame-generator engine,
//! even though (per §4.3.4–§4.3.7) this crate must implement it concretely
//! for the engine to be testable end to end.

mod background;
mod blend;
mod decoder;
mod geom;
mod scale;
mod text;

pub use background::composite_background;
pub use blend::blend_i420a_over;
pub use decoder::DefaultImageDecoder;
pub use geom::PixelRect;
pub use scale::{scale_i420_into, scale_plane_into};
pub use text::DefaultTextDrawer;
