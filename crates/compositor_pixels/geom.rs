/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

/// A destination or source rectangle in pixel space, always even on every
/// axis (required by 4:2:0 chroma subsampling, §3 invariants, §8 property
/// 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn round_down_even(v: u32) -> u32 {
    v & !1
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        PixelRect {
            x: round_down_even(x),
            y: round_down_even(y),
            width: round_down_even(width),
            height: round_down_even(height),
        }
    }

    /// Clamp this rect so it lies fully inside a `bound_w` x `bound_h`
    /// canvas, shrinking width/height rather than moving `x`/`y` (§4.3.5
    /// item 2: "clip to canvas bounds by shrinking width/height").
    pub fn clamp_to(self, bound_w: u32, bound_h: u32) -> PixelRect {
        let x = self.x.min(bound_w);
        let y = self.y.min(bound_h);
        let width = self.width.min(bound_w.saturating_sub(x));
        let height = self.height.min(bound_h.saturating_sub(y));
        PixelRect::new(x, y, width, height)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The same rect expressed in chroma (half-resolution) coordinates,
    /// for addressing U/V planes (§4.3.5 item 5: "U and V strides and
    /// coordinates are halved").
    pub fn to_chroma(self) -> PixelRect {
        PixelRect {
            x: self.x / 2,
            y: self.y / 2,
            width: self.width / 2,
            height: self.height / 2,
        }
    }
}
