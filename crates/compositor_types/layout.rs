/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::geometry::Region;

/// A region bound to an input index. `input == -1` is a placeholder with
/// no source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRegion {
    pub input: i32,
    pub region: Region,
}

impl InputRegion {
    pub fn new(input: i32, region: Region) -> Self {
        InputRegion { input, region }
    }

    pub fn is_placeholder(&self) -> bool {
        self.input < 0
    }
}

/// An ordered sequence of `InputRegion`. Order is draw order: later
/// entries paint on top.
pub type LayoutSolution = Vec<InputRegion>;
