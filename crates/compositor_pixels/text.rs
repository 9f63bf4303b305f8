/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use compositor_types::{I420Buffer, TextDrawer};

const BAR_HEIGHT_FRACTION: u32 = 8;
const BAR_Y: u8 = 16;
const BAR_CB: u8 = 128;
const BAR_CR: u8 = 128;

/// The crate's default `TextDrawer`: draws a single opaque bar along the
/// bottom of the frame, with no glyph shaping. Real text rendering is an
/// external collaborator; this exists so `draw_text`/`clear_text` are
/// exercisable without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTextDrawer;

impl TextDrawer for DefaultTextDrawer {
    fn draw(&self, canvas: &mut I420Buffer, _spec: &str) {
        if canvas.height == 0 || canvas.width == 0 {
            return;
        }
        let bar_height = (canvas.height / BAR_HEIGHT_FRACTION).max(1);
        let y_start = canvas.height.saturating_sub(bar_height);
        for y in y_start..canvas.height {
            let row_start = (y * canvas.y_stride) as usize;
            let row_end = row_start + canvas.width as usize;
            canvas.y[row_start..row_end].fill(BAR_Y);
        }

        let chroma_bar_height = (bar_height).div_ceil(2).max(1);
        let chroma_height = canvas.chroma_height();
        let chroma_y_start = chroma_height.saturating_sub(chroma_bar_height);
        let chroma_width = canvas.chroma_width();
        for y in chroma_y_start..chroma_height {
            let row_start = (y * canvas.uv_stride) as usize;
            let row_end = row_start + chroma_width as usize;
            canvas.u[row_start..row_end].fill(BAR_CB);
            canvas.v[row_start..row_end].fill(BAR_CR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_a_bottom_bar_leaving_the_top_untouched() {
        let mut canvas = I420Buffer::filled(8, 8, 200, 128, 128);
        DefaultTextDrawer.draw(&mut canvas, "anything");
        assert_eq!(canvas.y[0], 200);
        let last_row_start = (7 * canvas.y_stride) as usize;
        assert!(canvas.y[last_row_start..last_row_start + 8]
            .iter()
            .all(|&v| v == BAR_Y));
    }
}
