/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use compositor_pixels::{DefaultImageDecoder, DefaultTextDrawer};
use compositor_types::{
    Destination, FrameRef, I420Buffer, ImageDecoder, InputSource, LayoutSolution, Overlay,
    SceneSolution, TextDrawer, VideoSize, YuvColor,
};
use log::warn;

use crate::avatar_store::AvatarStore;
use crate::clock::MonotonicClock;
use crate::frame_generator::FrameGenerator;
use crate::input_slot::InputSlot;

/// The two fixed fps tiers every `Compositor` constructs (§4.3): a
/// high-rate generator for low-latency outputs and a lower-rate one for
/// cheaper subscribers.
const TIER_A: (u32, u32) = (60, 15);
const TIER_B: (u32, u32) = (48, 6);

/// Resolves an input index to its current frame on behalf of both
/// generators, breaking the back-pointer cycle a direct `Compositor`
/// reference would create (§9, "Cyclic ownership"). Shared between the two
/// generators via `Arc`, never exposed outside this module.
struct InputResolver {
    slots: Vec<InputSlot>,
    avatars: AvatarStore,
}

impl InputSource for InputResolver {
    /// Slot `i`'s frame if active and connected, whatever that is
    /// (including `None` if the slot hasn't received a frame yet); else the
    /// avatar for `i`; else `None` (§4.5). An active, connected slot with
    /// no frame yet renders nothing rather than falling back to the
    /// avatar.
    fn get_frame(&self, input: i32) -> Option<FrameRef> {
        let slot = self.slots.get(usize::try_from(input).ok()?)?;
        if slot.is_active() && slot.is_connected() {
            slot.pop()
        } else {
            self.avatars.get(input)
        }
    }
}

/// Top-level facade (§4.5): owns the two `FrameGenerator` tiers, the
/// `InputSlot` vector, and the `AvatarStore`, and routes every public
/// operation to the right collaborator.
pub struct Compositor {
    resolver: Arc<InputResolver>,
    tier_a: FrameGenerator,
    tier_b: FrameGenerator,
}

impl Compositor {
    pub fn new(
        max_input: usize,
        root_size: VideoSize,
        bg_color: YuvColor,
        bg_frame: Option<I420Buffer>,
        crop: bool,
    ) -> Self {
        let decoder: Arc<dyn ImageDecoder> = Arc::new(DefaultImageDecoder);
        let text_drawer: Arc<dyn TextDrawer> = Arc::new(DefaultTextDrawer);
        let clock = Arc::new(MonotonicClock::new());

        let resolver = Arc::new(InputResolver {
            slots: (0..max_input as i32).map(InputSlot::new).collect(),
            avatars: AvatarStore::new(decoder.clone()),
        });
        let input_source: Arc<dyn InputSource> = resolver.clone();

        let tier_a = FrameGenerator::new(
            root_size,
            bg_color,
            bg_frame.clone(),
            crop,
            TIER_A.0,
            TIER_A.1,
            input_source.clone(),
            decoder.clone(),
            text_drawer.clone(),
            clock.clone(),
        );
        let tier_b = FrameGenerator::new(
            root_size,
            bg_color,
            bg_frame,
            crop,
            TIER_B.0,
            TIER_B.1,
            input_source,
            decoder,
            text_drawer,
            clock,
        );

        Compositor {
            resolver,
            tier_a,
            tier_b,
        }
    }

    fn slot(&self, i: i32) -> Option<&InputSlot> {
        self.resolver.slots.get(usize::try_from(i).ok()?)
    }

    /// A producer joining input `i` (§4.5: routes to slot `i`).
    pub fn add_input(&self, i: i32) {
        match self.slot(i) {
            Some(slot) => slot.set_connected(true),
            None => warn!("add_input: index {i} out of range"),
        }
    }

    /// A producer leaving input `i`; the slot's busy frame is released and
    /// the generator falls back to the avatar, if any (§4.1 fallback).
    pub fn remove_input(&self, i: i32) {
        match self.slot(i) {
            Some(slot) => slot.set_connected(false),
            None => warn!("remove_input: index {i} out of range"),
        }
    }

    pub fn activate_input(&self, i: i32) {
        match self.slot(i) {
            Some(slot) => slot.set_active(true),
            None => warn!("activate_input: index {i} out of range"),
        }
    }

    pub fn deactivate_input(&self, i: i32) {
        match self.slot(i) {
            Some(slot) => slot.set_active(false),
            None => warn!("deactivate_input: index {i} out of range"),
        }
    }

    /// Ingests a raw-YUV avatar file URL for input `i` (§6). Returns
    /// whether the avatar was accepted.
    pub fn set_avatar_url(&self, i: i32, url: &str) -> bool {
        self.resolver.avatars.set_url(i, url)
    }

    /// Ingests an in-memory encoded avatar image for input `i`, overriding
    /// any URL-backed entry.
    pub fn set_avatar_bytes(&self, i: i32, bytes: &[u8]) -> bool {
        self.resolver.avatars.set_bytes(i, bytes)
    }

    pub fn unset_avatar(&self, i: i32) {
        self.resolver.avatars.unset(i);
    }

    /// Producer path: publish `frame` as input `i`'s current frame (§4.1).
    pub fn push_input(&self, i: i32, frame: &I420Buffer) {
        match self.slot(i) {
            Some(slot) => slot.push(frame),
            None => warn!("push_input: index {i} out of range"),
        }
    }

    /// Routed to both fps tiers so they render the same target scene
    /// (§4.5).
    pub fn update_layout_solution(&self, layout: LayoutSolution) {
        self.tier_a.update_layout_solution(layout.clone());
        self.tier_b.update_layout_solution(layout);
    }

    pub fn update_scene_solution(&self, scene: SceneSolution) {
        self.tier_a.update_scene_solution(scene.clone());
        self.tier_b.update_scene_solution(scene);
    }

    pub fn update_input_overlay(&self, input: i32, overlays: Vec<Overlay>) {
        self.tier_a.update_input_overlay(input, overlays.clone());
        self.tier_b.update_input_overlay(input, overlays);
    }

    pub fn draw_text(&self, spec: String) {
        self.tier_a.draw_text(spec.clone());
        self.tier_b.draw_text(spec);
    }

    pub fn clear_text(&self) {
        self.tier_a.clear_text();
        self.tier_b.clear_text();
    }

    /// Routed to whichever tier first accepts this output shape (§4.3,
    /// "an addOutput(w,h,fps) call goes to the first generator that
    /// accepts it").
    pub fn add_output(&self, width: u32, height: u32, fps: u32, dst: Arc<dyn Destination>) -> bool {
        if self.tier_a.add_output(width, height, fps, dst.clone()) {
            return true;
        }
        self.tier_b.add_output(width, height, fps, dst)
    }

    /// Removes `dst` from whichever tier holds it.
    pub fn remove_output(&self, dst: &Arc<dyn Destination>) -> bool {
        let removed_a = self.tier_a.remove_output(dst);
        let removed_b = self.tier_b.remove_output(dst);
        removed_a || removed_b
    }

    /// Accepted but explicitly unsupported: constructed root size and
    /// background color are fixed for the Compositor's lifetime (§4.5).
    pub fn update_root_size(&self, _size: VideoSize) {
        warn!("update_root_size is not supported; root size is fixed at construction");
    }

    pub fn update_background_color(&self, _color: YuvColor) {
        warn!("update_background_color is not supported; background color is fixed at construction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct CollectingDestination(StdMutex<Vec<compositor_types::ComposedFrame>>);
    impl Destination for CollectingDestination {
        fn on_frame(&self, frame: &compositor_types::ComposedFrame) {
            self.0.lock().unwrap().push(frame.clone());
        }
    }

    #[test]
    fn add_output_falls_through_to_the_second_tier() {
        let compositor = Compositor::new(
            1,
            VideoSize::new(640, 360),
            YuvColor::new(0, 128, 128),
            None,
            true,
        );
        let dst: Arc<dyn Destination> =
            Arc::new(CollectingDestination(StdMutex::new(Vec::new())));
        // fps=6 is only on the (48,6) tier's ladder, not (60,15)'s.
        assert!(compositor.add_output(640, 360, 6, dst.clone()));
        assert!(compositor.remove_output(&dst));
    }

    #[test]
    fn out_of_range_input_ops_warn_instead_of_panicking() {
        let compositor = Compositor::new(
            1,
            VideoSize::new(640, 360),
            YuvColor::new(0, 128, 128),
            None,
            true,
        );
        compositor.add_input(5);
        compositor.push_input(5, &I420Buffer::zeroed(4, 4));
        compositor.activate_input(-2);
    }

    #[test]
    fn avatar_fallback_after_disconnect_matches_scenario_s5() {
        let compositor = Compositor::new(
            1,
            VideoSize::new(64, 64),
            YuvColor::new(0, 128, 128),
            None,
            true,
        );
        compositor.add_input(0);
        compositor.push_input(0, &I420Buffer::filled(64, 64, 10, 128, 128));
        assert_eq!(
            compositor.resolver.get_frame(0).unwrap().y[0],
            10
        );
        compositor.remove_input(0);
        assert!(compositor.resolver.get_frame(0).is_none());

        let bytes = vec![99u8; I420Buffer::packed_len(64, 64)];
        let dir = std::env::temp_dir();
        let path = dir.join(format!(
            "compositor_core_compositor_test_{:?}.64x64.yuv",
            std::thread::current().id()
        ));
        std::fs::write(&path, &bytes).unwrap();
        assert!(compositor.set_avatar_url(0, path.to_str().unwrap()));
        assert_eq!(compositor.resolver.get_frame(0).unwrap().y[0], 99);
        let _ = std::fs::remove_file(&path);
    }
}
