/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::frame::I420ABuffer;
use crate::layout::LayoutSolution;

/// An alpha-blended overlay. `x`, `y`, `width`, `height` are normalized to
/// `[0, 1]` against the enclosing area (the parent region for per-input
/// overlays, the canvas for global overlays).
///
/// `image_buffer` is populated at config-stage time (§4.3.2), not under
/// the render lock, by decoding `image` with the host's `ImageDecoder`.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub image: Vec<u8>,
    pub image_buffer: Option<I420ABuffer>,
    pub z: i32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub disabled: bool,
}

impl Overlay {
    pub fn new(image: Vec<u8>, z: i32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Overlay {
            image,
            image_buffer: None,
            z,
            x,
            y,
            width,
            height,
            disabled: false,
        }
    }
}

/// A partial update to a generator's scene. Any `Some` field replaces the
/// corresponding live state atomically at the next tick boundary (§4.3.2).
#[derive(Debug, Clone, Default)]
pub struct SceneSolution {
    pub layout_effect: String,
    pub bg_image: Option<Vec<u8>>,
    pub layout: Option<LayoutSolution>,
    pub overlays: Option<Vec<Overlay>>,
}
