/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YuvColor {
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

impl YuvColor {
    pub fn new(y: u8, cb: u8, cr: u8) -> Self {
        YuvColor { y, cb, cr }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

impl VideoSize {
    pub fn new(width: u32, height: u32) -> Self {
        VideoSize { width, height }
    }
}
