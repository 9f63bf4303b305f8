/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use compositor_types::I420Buffer;

use crate::geom::PixelRect;

/// Box-filter scale of a single stride-addressed plane's `src_rect` into
/// `dst_rect`. Each destination sample is the average of the source
/// samples whose box maps onto it; when upscaling, a box degenerates to a
/// single source sample (nearest).
fn scale_plane(
    src: &[u8],
    src_stride: u32,
    src_rect: PixelRect,
    dst: &mut [u8],
    dst_stride: u32,
    dst_rect: PixelRect,
) {
    if src_rect.is_degenerate() || dst_rect.is_degenerate() {
        return;
    }
    for dy in 0..dst_rect.height {
        let sy0 = src_rect.y + (dy as u64 * src_rect.height as u64 / dst_rect.height as u64) as u32;
        let mut sy1 = src_rect.y
            + ((dy + 1) as u64 * src_rect.height as u64 / dst_rect.height as u64) as u32;
        sy1 = sy1.max(sy0 + 1).min(src_rect.y + src_rect.height);

        for dx in 0..dst_rect.width {
            let sx0 =
                src_rect.x + (dx as u64 * src_rect.width as u64 / dst_rect.width as u64) as u32;
            let mut sx1 = src_rect.x
                + ((dx + 1) as u64 * src_rect.width as u64 / dst_rect.width as u64) as u32;
            sx1 = sx1.max(sx0 + 1).min(src_rect.x + src_rect.width);

            let mut sum: u32 = 0;
            let mut count: u32 = 0;
            for sy in sy0..sy1 {
                let row_start = (sy * src_stride + sx0) as usize;
                let row_end = (sy * src_stride + sx1) as usize;
                for &sample in &src[row_start..row_end] {
                    sum += sample as u32;
                    count += 1;
                }
            }
            let value = if count > 0 { (sum / count) as u8 } else { 0 };
            let dst_idx = ((dst_rect.y + dy) * dst_stride + dst_rect.x + dx) as usize;
            dst[dst_idx] = value;
        }
    }
}

/// Scale a single tightly-packed (stride == width), non-chroma-subsampled
/// plane, such as an overlay's full-resolution alpha channel, which has no
/// U/V counterpart to piggyback on `scale_i420_into` (§4.3.7: "scale the
/// alpha plane in parallel ... with box filter").
pub fn scale_plane_into(
    src: &[u8],
    src_width: u32,
    src_rect: PixelRect,
    dst: &mut [u8],
    dst_width: u32,
    dst_rect: PixelRect,
) {
    scale_plane(src, src_width, src_rect, dst, dst_width, dst_rect);
}

/// Scale `src`'s `src_rect` (in luma/full-resolution coordinates) into
/// `dst`'s `dst_rect`, across Y, U and V, with U/V addressed at half
/// resolution and stride (§4.3.5 item 5).
pub fn scale_i420_into(
    src: &I420Buffer,
    src_rect: PixelRect,
    dst: &mut I420Buffer,
    dst_rect: PixelRect,
) {
    if src_rect.is_degenerate() || dst_rect.is_degenerate() {
        return;
    }
    scale_plane(
        &src.y,
        src.y_stride,
        src_rect,
        &mut dst.y,
        dst.y_stride,
        dst_rect,
    );
    let src_chroma = src_rect.to_chroma();
    let dst_chroma = dst_rect.to_chroma();
    scale_plane(
        &src.u,
        src.uv_stride,
        src_chroma,
        &mut dst.u,
        dst.uv_stride,
        dst_chroma,
    );
    scale_plane(
        &src.v,
        src.uv_stride,
        src_chroma,
        &mut dst.v,
        dst.uv_stride,
        dst_chroma,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downscale_averages_box() {
        // 4x2 luma plane, two rows of [0,0,255,255] -> scale to 2x2.
        let mut src = I420Buffer::zeroed(4, 2);
        src.y = vec![0, 0, 255, 255, 0, 0, 255, 255];
        let mut dst = I420Buffer::zeroed(2, 2);
        let src_rect = PixelRect::new(0, 0, 4, 2);
        let dst_rect = PixelRect::new(0, 0, 2, 2);
        scale_i420_into(&src, src_rect, &mut dst, dst_rect);
        assert_eq!(dst.y, vec![0, 255, 0, 255]);
    }

    #[test]
    fn identity_scale_copies_plane() {
        let src = I420Buffer::filled(4, 4, 100, 120, 140);
        let mut dst = I420Buffer::zeroed(4, 4);
        let rect = PixelRect::new(0, 0, 4, 4);
        scale_i420_into(&src, rect, &mut dst, rect);
        assert_eq!(dst.y, src.y);
        assert_eq!(dst.u, src.u);
        assert_eq!(dst.v, src.v);
    }
}
