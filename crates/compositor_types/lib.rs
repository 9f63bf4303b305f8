/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Data model and capability traits shared between the compositor core and
//! its raster/decode collaborators.
//!
//! This crate holds only plain data (`Rational`, `Rect`, `LayoutSolution`,
//! `Overlay`, ...) and the narrow capability traits (`Destination`,
//! `InputSource`, `Clock`, `ImageDecoder`, `TextDrawer`) that let
//! `compositor_core` avoid a back-pointer cycle to its host and avoid
//! hard-coding a pixel codec or font shaper.

mod color;
mod error;
mod frame;
mod geometry;
mod layout;
mod overlay;
mod rational;
mod traits;

pub use color::{VideoSize, YuvColor};
pub use error::CompositorError;
pub use frame::{ComposedFrame, FrameRef, I420ABuffer, I420Buffer};
pub use geometry::{Area, Circle, Rect, Region, Shape};
pub use layout::{InputRegion, LayoutSolution};
pub use overlay::{Overlay, SceneSolution};
pub use rational::Rational;
pub use traits::{Clock, Destination, ImageDecoder, InputSource, TextDrawer};
