/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use compositor_types::{FrameRef, I420Buffer, ImageDecoder};
use log::warn;
use parking_lot::Mutex;

enum Entry {
    Url(String),
    Bytes(FrameRef),
}

struct Inner {
    entries: HashMap<i32, Entry>,
    /// URL -> (decoded frame, number of indices currently backed by it).
    /// Evicted only when the refcount drops to zero (§4.2).
    url_cache: HashMap<String, (FrameRef, usize)>,
}

/// Static fallback image per input index, used when an `InputSlot` is
/// inactive or disconnected (§4.2).
pub struct AvatarStore {
    decoder: Arc<dyn ImageDecoder>,
    inner: Mutex<Inner>,
}

/// Parses `<...>.<W>x<H>.<ext>`, the numeric `W`/`H` immediately before the
/// final extension (§6). No regex: `Path::file_stem` plus one `rsplit_once`
/// and one `split_once` say the same thing.
fn parse_dimensions(url: &str) -> Option<(u32, u32)> {
    let stem = Path::new(url).file_stem()?.to_str()?;
    let (_, dims) = stem.rsplit_once('.')?;
    let (w, h) = dims.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

impl AvatarStore {
    pub fn new(decoder: Arc<dyn ImageDecoder>) -> Self {
        AvatarStore {
            decoder,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                url_cache: HashMap::new(),
            }),
        }
    }

    fn release_index(inner: &mut Inner, index: i32) {
        if let Some(Entry::Url(url)) = inner.entries.remove(&index) {
            if let Some((_, refcount)) = inner.url_cache.get_mut(&url) {
                *refcount -= 1;
                if *refcount == 0 {
                    inner.url_cache.remove(&url);
                }
            }
        }
    }

    /// Ingest a raw-YUV file URL whose name encodes its dimensions.
    /// Multiple indices pointing at the same URL share one decoded frame.
    pub fn set_url(&self, index: i32, url: &str) -> bool {
        let Some((width, height)) = parse_dimensions(url) else {
            warn!("avatar store: malformed avatar URL {url:?}");
            return false;
        };

        let mut inner = self.inner.lock();
        Self::release_index(&mut inner, index);

        if let Some((_, refcount)) = inner.url_cache.get_mut(url) {
            *refcount += 1;
            inner.entries.insert(index, Entry::Url(url.to_string()));
            return true;
        }

        let bytes = match std::fs::read(url) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("avatar store: failed to read {url:?}: {err}");
                return false;
            }
        };
        let Some(buffer) = I420Buffer::from_packed(width, height, &bytes) else {
            warn!(
                "avatar store: {url:?} is not exactly {} bytes of raw {width}x{height} I420",
                I420Buffer::packed_len(width, height)
            );
            return false;
        };

        let frame: FrameRef = Arc::new(buffer);
        inner
            .url_cache
            .insert(url.to_string(), (frame.clone(), 1));
        inner.entries.insert(index, Entry::Url(url.to_string()));
        true
    }

    /// Ingest an in-memory encoded image (PNG/JPEG). Takes precedence over
    /// any URL-backed entry for this index.
    pub fn set_bytes(&self, index: i32, bytes: &[u8]) -> bool {
        let decoded = match self.decoder.decode(bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                warn!("avatar store: decode failed for input {index}: {err}");
                return false;
            }
        };
        let mut inner = self.inner.lock();
        Self::release_index(&mut inner, index);
        inner
            .entries
            .insert(index, Entry::Bytes(Arc::new(decoded.base)));
        true
    }

    pub fn unset(&self, index: i32) {
        let mut inner = self.inner.lock();
        Self::release_index(&mut inner, index);
    }

    pub fn get(&self, index: i32) -> Option<FrameRef> {
        let inner = self.inner.lock();
        match inner.entries.get(&index)? {
            Entry::Url(url) => inner.url_cache.get(url).map(|(frame, _)| frame.clone()),
            Entry::Bytes(frame) => Some(frame.clone()),
        }
    }
}
