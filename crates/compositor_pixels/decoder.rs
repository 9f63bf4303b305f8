/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use compositor_types::{CompositorError, I420ABuffer, I420Buffer, ImageDecoder};
use image::GenericImageView;

/// The crate's default `ImageDecoder`, backed by the `image` crate.
/// Decodes arbitrary compressed bytes (PNG/JPEG, per the enabled
/// features) to RGBA8 and converts to BT.601 I420 with a full-resolution
/// alpha plane.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultImageDecoder;

fn rgb_to_y(r: f32, g: f32, b: f32) -> u8 {
    (0.299 * r + 0.587 * g + 0.114 * b).round().clamp(0.0, 255.0) as u8
}

fn rgb_to_cb(r: f32, g: f32, b: f32) -> u8 {
    (-0.168_736 * r - 0.331_264 * g + 0.5 * b + 128.0)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn rgb_to_cr(r: f32, g: f32, b: f32) -> u8 {
    (0.5 * r - 0.418_688 * g - 0.081_312 * b + 128.0)
        .round()
        .clamp(0.0, 255.0) as u8
}

impl ImageDecoder for DefaultImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<I420ABuffer, CompositorError> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| CompositorError::DecodeFailure(err.to_string()))?;
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(CompositorError::DecodeFailure(
                "decoded image has zero dimension".to_string(),
            ));
        }
        let rgba = img.to_rgba8();

        let mut base = I420Buffer::zeroed(width, height);
        let mut alpha = vec![0u8; (width * height) as usize];

        for y in 0..height {
            for x in 0..width {
                let px = rgba.get_pixel(x, y);
                let [r, g, b, a] = px.0;
                let idx = (y * base.y_stride + x) as usize;
                base.y[idx] = rgb_to_y(r as f32, g as f32, b as f32);
                alpha[(y * width + x) as usize] = a;
            }
        }

        let chroma_w = base.chroma_width();
        let chroma_h = base.chroma_height();
        for cy in 0..chroma_h {
            for cx in 0..chroma_w {
                let (mut rs, mut gs, mut bs, mut count) = (0u32, 0u32, 0u32, 0u32);
                for dy in 0..2 {
                    for dx in 0..2 {
                        let x = (cx * 2 + dx).min(width - 1);
                        let y = (cy * 2 + dy).min(height - 1);
                        let px = rgba.get_pixel(x, y);
                        rs += px.0[0] as u32;
                        gs += px.0[1] as u32;
                        bs += px.0[2] as u32;
                        count += 1;
                    }
                }
                let r = (rs / count) as f32;
                let g = (gs / count) as f32;
                let b = (bs / count) as f32;
                let idx = (cy * base.uv_stride + cx) as usize;
                base.u[idx] = rgb_to_cb(r, g, b);
                base.v[idx] = rgb_to_cr(r, g, b);
            }
        }

        Ok(I420ABuffer { base, alpha })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_bytes() {
        let decoder = DefaultImageDecoder;
        let err = decoder.decode(&[0u8, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, CompositorError::DecodeFailure(_)));
    }
}
