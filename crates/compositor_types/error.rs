/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;

/// The five error kinds of §7. Plain enum, no `thiserror` — neither
/// `compositing` nor `media` pull it in, and a handful of unit/tuple
/// variants don't need derive-macro machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorError {
    /// Unsupported output fps, a non-rectangle region used where only
    /// rectangles are rendered, or a malformed avatar URL.
    InvalidArgument(String),
    /// An input slot's buffer pool was empty on push. Logged, never
    /// surfaced to the caller that pushed.
    ResourceExhausted(String),
    /// Avatar or overlay image decoding failed. Logged; the overlay or
    /// avatar is silently absent.
    DecodeFailure(String),
    /// A region or overlay clipped to zero width or height.
    GeometryDegenerate(String),
    /// A raster primitive (scale/blend) reported failure.
    Internal(String),
}

impl fmt::Display for CompositorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositorError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            CompositorError::ResourceExhausted(msg) => write!(f, "resource exhausted: {msg}"),
            CompositorError::DecodeFailure(msg) => write!(f, "decode failure: {msg}"),
            CompositorError::GeometryDegenerate(msg) => write!(f, "degenerate geometry: {msg}"),
            CompositorError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for CompositorError {}
