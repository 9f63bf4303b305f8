/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

/// An owned, stride-aware I420 (4:2:0 planar YUV) buffer: Y at full
/// resolution, U/V each at half resolution on both axes.
///
/// Strides may exceed the logical plane width, which `compositor_pixels`'
/// scale/blend routines must respect (§4.3.5 item 5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I420Buffer {
    pub width: u32,
    pub height: u32,
    pub y_stride: u32,
    pub uv_stride: u32,
    pub y: Vec<u8>,
    pub u: Vec<u8>,
    pub v: Vec<u8>,
}

fn chroma_dim(dim: u32) -> u32 {
    dim.div_ceil(2)
}

impl I420Buffer {
    /// Allocate a tightly-strided (no padding) buffer of the given size,
    /// filled with the given constant YUV color.
    pub fn filled(width: u32, height: u32, y: u8, cb: u8, cr: u8) -> Self {
        let chroma_w = chroma_dim(width);
        let chroma_h = chroma_dim(height);
        I420Buffer {
            width,
            height,
            y_stride: width,
            uv_stride: chroma_w,
            y: vec![y; (width * height) as usize],
            u: vec![cb; (chroma_w * chroma_h) as usize],
            v: vec![cr; (chroma_w * chroma_h) as usize],
        }
    }

    pub fn zeroed(width: u32, height: u32) -> Self {
        I420Buffer::filled(width, height, 0, 0, 0)
    }

    /// The exact byte length of a tightly-packed I420 buffer of this size,
    /// i.e. `(w*h*3 + 1) / 2`, used to validate raw avatar files.
    pub fn packed_len(width: u32, height: u32) -> usize {
        let luma = (width as u64) * (height as u64);
        ((luma * 3 + 1) / 2) as usize
    }

    /// Build a tightly-strided buffer from raw planar bytes in Y, U, V
    /// order, as required by the avatar URL contract (§6).
    pub fn from_packed(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::packed_len(width, height) {
            return None;
        }
        let luma = (width * height) as usize;
        let chroma_w = chroma_dim(width);
        let chroma_h = chroma_dim(height);
        let chroma_len = (chroma_w * chroma_h) as usize;
        let (y_part, rest) = bytes.split_at(luma);
        let (u_part, v_part) = rest.split_at(chroma_len);
        Some(I420Buffer {
            width,
            height,
            y_stride: width,
            uv_stride: chroma_w,
            y: y_part.to_vec(),
            u: u_part.to_vec(),
            v: v_part.to_vec(),
        })
    }

    pub fn chroma_width(&self) -> u32 {
        chroma_dim(self.width)
    }

    pub fn chroma_height(&self) -> u32 {
        chroma_dim(self.height)
    }
}

/// An I420 buffer plus a fourth, full-resolution alpha plane, used for
/// overlay sources and decoded avatar/background images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I420ABuffer {
    pub base: I420Buffer,
    pub alpha: Vec<u8>,
}

impl I420ABuffer {
    pub fn opaque(width: u32, height: u32, y: u8, cb: u8, cr: u8) -> Self {
        I420ABuffer {
            base: I420Buffer::filled(width, height, y, cb, cr),
            alpha: vec![255; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.base.width
    }

    pub fn height(&self) -> u32 {
        self.base.height
    }
}

/// A reference-counted handle to a published I420 buffer. Producers
/// publish a whole buffer-ref; consumers read it without copying, and the
/// handle keeps the buffer alive past the critical section that read it
/// (§4.1).
pub type FrameRef = Arc<I420Buffer>;

/// The final, delivered composite frame (§4.3.9).
#[derive(Debug, Clone)]
pub struct ComposedFrame {
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: u64,
    pub timestamp_rtp_90khz: u64,
    pub payload: FrameRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_len_matches_spec_formula() {
        assert_eq!(I420Buffer::packed_len(4, 4), (4 * 4 * 3 + 1) / 2);
        assert_eq!(I420Buffer::packed_len(320, 180), (320 * 180 * 3 + 1) / 2);
    }

    #[test]
    fn from_packed_round_trips_planes() {
        let w = 4;
        let h = 4;
        let mut bytes = vec![7u8; I420Buffer::packed_len(w, h)];
        bytes[0] = 42; // first Y sample
        let buf = I420Buffer::from_packed(w, h, &bytes).unwrap();
        assert_eq!(buf.y[0], 42);
        assert_eq!(buf.u.len(), (buf.chroma_width() * buf.chroma_height()) as usize);
    }

    #[test]
    fn from_packed_rejects_wrong_length() {
        assert!(I420Buffer::from_packed(4, 4, &[0u8; 3]).is_none());
    }
}
