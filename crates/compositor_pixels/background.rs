/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use compositor_types::I420Buffer;

use crate::geom::PixelRect;
use crate::scale::scale_i420_into;

/// Composite `bg` onto `canvas` using aspect-fit-cover: crop `bg` (never
/// scale-with-padding) so its aspect matches the canvas, then box-filter
/// scale the crop to fill the canvas entirely (§4.3.4).
pub fn composite_background(canvas: &mut I420Buffer, bg: &I420Buffer) {
    let canvas_aspect = canvas.width as f64 / canvas.height as f64;
    let bg_aspect = bg.width as f64 / bg.height as f64;

    let (crop_w, crop_h) = if bg_aspect - canvas_aspect > 0.001 {
        (canvas_aspect * bg.height as f64, bg.height as f64)
    } else if canvas_aspect - bg_aspect > 0.001 {
        (bg.width as f64, bg.width as f64 / canvas_aspect)
    } else {
        (bg.width as f64, bg.height as f64)
    };

    let crop_x = ((bg.width as f64 - crop_w) / 2.0).max(0.0);
    let crop_y = ((bg.height as f64 - crop_h) / 2.0).max(0.0);

    let src_rect =
        PixelRect::new(crop_x as u32, crop_y as u32, crop_w as u32, crop_h as u32)
            .clamp_to(bg.width, bg.height);
    let dst_rect = PixelRect::new(0, 0, canvas.width, canvas.height);
    scale_i420_into(bg, src_rect, canvas, dst_rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_aspect_crops_nothing() {
        let mut canvas = I420Buffer::zeroed(4, 4);
        let bg = I420Buffer::filled(4, 4, 42, 42, 42);
        composite_background(&mut canvas, &bg);
        assert!(canvas.y.iter().all(|&v| v == 42));
    }

    #[test]
    fn wider_background_is_cropped_horizontally() {
        // bg is 8x2 (aspect 4), canvas is 2x2 (aspect 1): crop to the
        // centered 2x2 region, which is the middle third.
        let mut bg = I420Buffer::zeroed(8, 2);
        // Columns 0-1 = 0, 2-5 = 200 (center), 6-7 = 0
        for row in 0..2u32 {
            for col in 0..8u32 {
                let v = if (2..6).contains(&col) { 200 } else { 0 };
                bg.y[(row * 8 + col) as usize] = v;
            }
        }
        let mut canvas = I420Buffer::zeroed(2, 2);
        composite_background(&mut canvas, &bg);
        assert!(canvas.y.iter().all(|&v| v == 200));
    }
}
