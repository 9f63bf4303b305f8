/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use compositor_pixels::{PixelRect, blend_i420a_over, composite_background, scale_i420_into, scale_plane_into};
use compositor_types::{
    Area, Clock, ComposedFrame, Destination, I420ABuffer, I420Buffer, ImageDecoder, InputSource,
    LayoutSolution, Overlay, Rect, SceneSolution, TextDrawer, VideoSize, YuvColor,
};
use log::{error, warn};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::buffer_pool::FramePool;
use crate::output_registry::OutputRegistry;
use crate::timer::TickClock;
use crate::tween::tween_layout;

const CANVAS_POOL_CAPACITY: usize = 2;
const PARALLEL_REGION_THRESHOLD: usize = 5;
const MAX_WORKER_THREADS: usize = 16;

/// Construction parameters that never change after `FrameGenerator::new`
/// (§4.3).
struct StaticConfig {
    canvas: VideoSize,
    bg_color: YuvColor,
    crop: bool,
    max_fps: u32,
}

/// Arbitrary-thread-writable staging area for `updateLayoutSolution`,
/// `updateSceneSolution` and `updateInputOverlay` (§4.3.2). Guarded by a
/// single short-held write lock; promoted into `LiveState` at the top of
/// each tick under the same lock.
#[derive(Default)]
struct StagedConfig {
    layout: Option<LayoutSolution>,
    overlays: Option<Vec<Overlay>>,
    bg_image: Option<I420Buffer>,
    /// `Some(Some(spec))` sets the banner, `Some(None)` clears it.
    text: Option<Option<String>>,
    input_overlays: HashMap<i32, Vec<Overlay>>,
}

/// State touched only by the thread executing a tick (the `TickClock`
/// thread in production, or the calling thread under `tick_once` in
/// tests) — no synchronization needed on the read side (§5, "the live
/// configuration is only mutated by the timer thread").
struct LiveState {
    target_layout: LayoutSolution,
    current_layout: LayoutSolution,
    overlays: Vec<Overlay>,
    input_overlays: HashMap<i32, Vec<Overlay>>,
    bg_image: Option<I420Buffer>,
    text: Option<String>,
    tick: u64,
}

pub(crate) struct GeneratorState {
    config: StaticConfig,
    staged: Mutex<StagedConfig>,
    live: Mutex<LiveState>,
    registry: OutputRegistry,
    canvas_pool: Mutex<FramePool>,
    worker_pool: Option<ThreadPool>,
    input_source: Arc<dyn InputSource>,
    image_decoder: Arc<dyn ImageDecoder>,
    text_drawer: Arc<dyn TextDrawer>,
    clock: Arc<dyn Clock>,
}

/// The clocked render loop (§4.3). Owns the canvas buffer pool, the
/// live/staged scene, and (optionally) a worker pool for parallel region
/// rendering; fans composed frames out through its `OutputRegistry`.
pub struct FrameGenerator {
    state: Arc<GeneratorState>,
    /// `None` under `new_for_test` — the caller drives ticks explicitly via
    /// `tick_once` instead of a background thread (§8, "added").
    _timer: Option<TickClock>,
}

/// Validates the `(maxFps, minFps)` ladder invariant (§4.3): the sequence
/// `minFps, 2*minFps, 4*minFps, ...` must land exactly on `maxFps`.
/// Otherwise `maxFps` is clamped down to `minFps` and a warning is logged.
fn validate_fps_ladder(max_fps: u32, min_fps: u32) -> (u32, u32) {
    assert!(min_fps >= 1, "minFps must be at least 1");
    let mut candidate = min_fps;
    loop {
        if candidate == max_fps {
            return (max_fps, min_fps);
        }
        if candidate > max_fps {
            warn!(
                "fps ladder {min_fps}..{max_fps} never lands on maxFps by doubling; \
                 clamping maxFps to {min_fps}"
            );
            return (min_fps, min_fps);
        }
        candidate *= 2;
    }
}

fn build_worker_pool() -> Option<ThreadPool> {
    let size = (num_cpus::get() / 2).min(MAX_WORKER_THREADS);
    if size < 2 {
        return None;
    }
    ThreadPoolBuilder::new()
        .num_threads(size)
        .thread_name(|i| format!("compositor-render-{i}"))
        .build()
        .ok()
}

impl FrameGenerator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        canvas: VideoSize,
        bg_color: YuvColor,
        bg_image: Option<I420Buffer>,
        crop: bool,
        max_fps: u32,
        min_fps: u32,
        input_source: Arc<dyn InputSource>,
        image_decoder: Arc<dyn ImageDecoder>,
        text_drawer: Arc<dyn TextDrawer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = Self::build_state(
            canvas,
            bg_color,
            bg_image,
            crop,
            max_fps,
            min_fps,
            input_source,
            image_decoder,
            text_drawer,
            clock,
        );
        let period = Duration::from_millis(1_000 / state.config.max_fps.max(1) as u64);
        let tick_state = state.clone();
        let timer = TickClock::start(period, move || run_tick(&tick_state));
        FrameGenerator {
            state,
            _timer: Some(timer),
        }
    }

    /// A generator with no background timer thread: tests drive ticks
    /// synchronously via `tick_once` (§8, "added").
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_test(
        canvas: VideoSize,
        bg_color: YuvColor,
        bg_image: Option<I420Buffer>,
        crop: bool,
        max_fps: u32,
        min_fps: u32,
        input_source: Arc<dyn InputSource>,
        image_decoder: Arc<dyn ImageDecoder>,
        text_drawer: Arc<dyn TextDrawer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = Self::build_state(
            canvas,
            bg_color,
            bg_image,
            crop,
            max_fps,
            min_fps,
            input_source,
            image_decoder,
            text_drawer,
            clock,
        );
        FrameGenerator {
            state,
            _timer: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_state(
        canvas: VideoSize,
        bg_color: YuvColor,
        bg_image: Option<I420Buffer>,
        crop: bool,
        max_fps: u32,
        min_fps: u32,
        input_source: Arc<dyn InputSource>,
        image_decoder: Arc<dyn ImageDecoder>,
        text_drawer: Arc<dyn TextDrawer>,
        clock: Arc<dyn Clock>,
    ) -> Arc<GeneratorState> {
        let (max_fps, min_fps) = validate_fps_ladder(max_fps, min_fps);
        Arc::new(GeneratorState {
            config: StaticConfig {
                canvas,
                bg_color,
                crop,
                max_fps,
            },
            staged: Mutex::new(StagedConfig::default()),
            live: Mutex::new(LiveState {
                target_layout: Vec::new(),
                current_layout: Vec::new(),
                overlays: Vec::new(),
                input_overlays: HashMap::new(),
                bg_image,
                text: None,
                tick: 0,
            }),
            registry: OutputRegistry::new(max_fps, min_fps, canvas.width, canvas.height),
            canvas_pool: Mutex::new(FramePool::new(CANVAS_POOL_CAPACITY)),
            worker_pool: build_worker_pool(),
            input_source,
            image_decoder,
            text_drawer,
            clock,
        })
    }

    pub fn is_supported(&self, width: u32, height: u32, fps: u32) -> bool {
        self.state.registry.is_supported(width, height, fps)
    }

    pub fn add_output(&self, width: u32, height: u32, fps: u32, dst: Arc<dyn Destination>) -> bool {
        self.state.registry.add(width, height, fps, dst)
    }

    pub fn remove_output(&self, dst: &Arc<dyn Destination>) -> bool {
        self.state.registry.remove(dst)
    }

    pub fn update_layout_solution(&self, layout: LayoutSolution) {
        self.state.staged.lock().layout = Some(layout);
    }

    pub fn update_input_overlay(&self, input: i32, overlays: Vec<Overlay>) {
        let decoded = self.decode_overlays(overlays);
        self.state
            .staged
            .lock()
            .input_overlays
            .insert(input, decoded);
    }

    pub fn update_scene_solution(&self, scene: SceneSolution) {
        let mut staged = self.state.staged.lock();
        if let Some(layout) = scene.layout {
            staged.layout = Some(layout);
        }
        if let Some(overlays) = scene.overlays {
            drop(staged);
            let decoded = self.decode_overlays(overlays);
            staged = self.state.staged.lock();
            staged.overlays = Some(decoded);
        }
        if let Some(bg_bytes) = scene.bg_image {
            match self.state.image_decoder.decode(&bg_bytes) {
                Ok(decoded) => staged.bg_image = Some(decoded.base),
                Err(err) => warn!("background image decode failed: {err}"),
            }
        }
    }

    pub fn draw_text(&self, spec: String) {
        self.state.staged.lock().text = Some(Some(spec));
    }

    pub fn clear_text(&self) {
        self.state.staged.lock().text = Some(None);
    }

    /// Decodes each overlay's `image` bytes into `image_buffer` at stage
    /// time, off the render lock (§4.3.2).
    fn decode_overlays(&self, overlays: Vec<Overlay>) -> Vec<Overlay> {
        overlays
            .into_iter()
            .map(|mut overlay| {
                match self.state.image_decoder.decode(&overlay.image) {
                    Ok(decoded) => overlay.image_buffer = Some(decoded),
                    Err(err) => {
                        warn!("overlay image decode failed: {err}");
                        overlay.image_buffer = None;
                    }
                }
                overlay
            })
            .collect()
    }

    /// Synchronous, single-threaded entry point used by tests to drive one
    /// tick without a background timer (§8, "added").
    pub fn tick_once(&self) {
        run_tick(&self.state);
    }
}

fn promote_staged_config(state: &GeneratorState, live: &mut LiveState) {
    let mut staged = state.staged.lock();
    if let Some(layout) = staged.layout.take() {
        live.target_layout = layout;
    }
    if let Some(overlays) = staged.overlays.take() {
        live.overlays = overlays;
    }
    if let Some(bg_image) = staged.bg_image.take() {
        live.bg_image = Some(bg_image);
    }
    if let Some(text) = staged.text.take() {
        live.text = text;
    }
    for (input, overlays) in staged.input_overlays.drain() {
        live.input_overlays.insert(input, overlays);
    }
}

fn rect_to_canvas_pixels(rect: Rect, canvas_w: u32, canvas_h: u32) -> PixelRect {
    let x = rect.left.to_pixels(canvas_w);
    let y = rect.top.to_pixels(canvas_h);
    let w = rect.width.to_pixels(canvas_w);
    let h = rect.height.to_pixels(canvas_h);
    PixelRect::new(x, y, w, h).clamp_to(canvas_w, canvas_h)
}

/// Computes the source crop and (unchanged) destination rect in crop mode,
/// or the full source and a letterboxed destination in letterbox mode
/// (§4.3.5 item 3).
fn fit_region(src_w: u32, src_h: u32, dest: PixelRect, crop: bool) -> Option<(PixelRect, PixelRect)> {
    if dest.is_degenerate() || src_w == 0 || src_h == 0 {
        return None;
    }
    let dest_aspect = dest.width as f64 / dest.height as f64;
    let src_aspect = src_w as f64 / src_h as f64;

    if crop {
        let (crop_w, crop_h) = if src_aspect > dest_aspect {
            (dest_aspect * src_h as f64, src_h as f64)
        } else {
            (src_w as f64, src_w as f64 / dest_aspect)
        };
        let crop_x = ((src_w as f64 - crop_w) / 2.0).max(0.0);
        let crop_y = ((src_h as f64 - crop_h) / 2.0).max(0.0);
        let src_rect = PixelRect::new(crop_x as u32, crop_y as u32, crop_w as u32, crop_h as u32)
            .clamp_to(src_w, src_h);
        Some((src_rect, dest))
    } else {
        let (fit_w, fit_h) = if src_aspect > dest_aspect {
            (dest.width as f64, dest.width as f64 / src_aspect)
        } else {
            (dest.height as f64 * src_aspect, dest.height as f64)
        };
        let fit_x = dest.x as f64 + (dest.width as f64 - fit_w) / 2.0;
        let fit_y = dest.y as f64 + (dest.height as f64 - fit_h) / 2.0;
        let src_rect = PixelRect::new(0, 0, src_w, src_h);
        let letterboxed = PixelRect::new(fit_x as u32, fit_y as u32, fit_w as u32, fit_h as u32)
            .clamp_to(dest.x + dest.width, dest.y + dest.height);
        Some((src_rect, letterboxed))
    }
}

fn render_region(canvas: &mut I420Buffer, source: &I420Buffer, dest: PixelRect, crop: bool) {
    let Some((src_rect, dst_rect)) = fit_region(source.width, source.height, dest, crop) else {
        return;
    };
    if src_rect.is_degenerate() || dst_rect.is_degenerate() {
        return;
    }
    scale_i420_into(source, src_rect, canvas, dst_rect);
}

fn bounding_boxes_overlap(a: PixelRect, b: PixelRect) -> bool {
    a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
}

/// A minimal union-find with path compression and union-by-size, scoped to
/// `group_regions_for_parallel_render`'s overlap merge.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        DisjointSet {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            self.parent[i] = self.find(self.parent[i]);
        }
        self.parent[i]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Groups region indices into at most `target_chunks` contiguous runs,
/// then merges any regions whose destination bounding boxes overlap,
/// transitively, into one group (§4.3.6 option (b)): overlapping regions
/// always end up serialized on the same rayon task, even across an initial
/// chunk boundary and even when the overlap is only transitive (A overlaps
/// B, B overlaps C, A and C land in the same group as B).
fn group_regions_for_parallel_render(dest_rects: &[PixelRect], target_chunks: usize) -> Vec<Vec<usize>> {
    let n = dest_rects.len();
    let chunk_size = n.div_ceil(target_chunks.max(1)).max(1);
    let mut sets = DisjointSet::new(n);
    for i in 0..n {
        let chunk_id = i / chunk_size;
        sets.union(i, chunk_id * chunk_size);
    }
    for i in 0..n {
        for j in 0..i {
            if bounding_boxes_overlap(dest_rects[i], dest_rects[j]) {
                sets.union(i, j);
            }
        }
    }
    let mut groups: std::collections::BTreeMap<usize, Vec<usize>> = Default::default();
    for i in 0..n {
        let root = sets.find(i);
        groups.entry(root).or_default().push(i);
    }
    groups.into_values().collect()
}

/// Wraps a raw pointer to the canvas so it can be shared across rayon
/// tasks. SAFETY: callers must only dereference this from tasks whose
/// region groups were produced by `group_regions_for_parallel_render`,
/// which guarantees distinct groups never touch overlapping pixels.
struct CanvasPtr(*mut I420Buffer);
unsafe impl Send for CanvasPtr {}
unsafe impl Sync for CanvasPtr {}

fn render_regions(
    state: &GeneratorState,
    canvas: &mut I420Buffer,
    layout: &LayoutSolution,
) {
    struct Resolved {
        dest: PixelRect,
        source: compositor_types::FrameRef,
    }

    let crop = state.config.crop;
    let canvas_w = canvas.width;
    let canvas_h = canvas.height;

    let resolved: Vec<Resolved> = layout
        .iter()
        .filter(|ir| ir.input >= 0)
        .filter_map(|ir| {
            if ir.region.shape() != compositor_types::Shape::Rectangle {
                return None;
            }
            let Area::Rectangle(rect) = ir.region.area else {
                return None;
            };
            let source = state.input_source.get_frame(ir.input)?;
            let dest = rect_to_canvas_pixels(rect, canvas_w, canvas_h);
            if dest.is_degenerate() {
                warn!("region for input {} clipped to zero size, skipping", ir.input);
                return None;
            }
            Some(Resolved { dest, source })
        })
        .collect();

    if resolved.is_empty() {
        return;
    }

    let use_parallel = state
        .worker_pool
        .as_ref()
        .is_some_and(|_| resolved.len() >= PARALLEL_REGION_THRESHOLD);

    if !use_parallel {
        for item in &resolved {
            render_region(canvas, &item.source, item.dest, crop);
        }
        return;
    }

    let pool = state.worker_pool.as_ref().unwrap();
    let dest_rects: Vec<PixelRect> = resolved.iter().map(|r| r.dest).collect();
    let groups = group_regions_for_parallel_render(&dest_rects, pool.current_num_threads().min(MAX_WORKER_THREADS));
    let canvas_ptr = CanvasPtr(canvas as *mut I420Buffer);

    pool.install(|| {
        use rayon::prelude::*;
        groups.par_iter().for_each(|indices| {
            // SAFETY: `groups` partitions regions so overlapping
            // destination rects always land in the same group; distinct
            // groups never write the same bytes.
            let canvas: &mut I420Buffer = unsafe { &mut *canvas_ptr.0 };
            for &i in indices {
                render_region(canvas, &resolved[i].source, resolved[i].dest, crop);
            }
        });
    });
}

/// Computes an overlay's destination rect in pixels. Preserves the source
/// quirk where `y` and `height` are both scaled by `area`'s *width*, not
/// its height (§4.3.7, §9 open question — not silently fixed).
fn overlay_destination_rect(overlay: &Overlay, area: PixelRect) -> PixelRect {
    let area_width = area.width as f64;
    let x = area.x as f64 + overlay.x * area_width;
    let y = area.y as f64 + overlay.y * area_width;
    let width = overlay.width * area_width;
    let height = overlay.height * area_width;
    PixelRect::new(x as u32, y as u32, width as u32, height as u32)
}

/// Clips `dest` to the canvas and, if clipped, computes the proportionally
/// reduced source sub-rect so the visible portion isn't squashed to fit
/// (§4.3.7: "Clip destination to canvas; if clipped, reduce source width/
/// height proportionally").
fn clip_overlay(dest: PixelRect, canvas_w: u32, canvas_h: u32, src_w: u32, src_h: u32) -> Option<(PixelRect, PixelRect)> {
    let clipped = dest.clamp_to(canvas_w, canvas_h);
    if clipped.is_degenerate() || dest.width == 0 || dest.height == 0 {
        return None;
    }
    let src_w_eff = ((src_w as u64 * clipped.width as u64) / dest.width as u64) as u32;
    let src_h_eff = ((src_h as u64 * clipped.height as u64) / dest.height as u64) as u32;
    let src_rect = PixelRect::new(0, 0, src_w_eff, src_h_eff);
    if src_rect.is_degenerate() {
        return None;
    }
    Some((src_rect, clipped))
}

fn render_overlay(canvas: &mut I420Buffer, overlay: &Overlay, area: PixelRect) {
    if overlay.disabled {
        return;
    }
    let Some(source) = overlay.image_buffer.as_ref() else {
        return;
    };
    let dest = overlay_destination_rect(overlay, area);
    let Some((src_rect, clipped)) = clip_overlay(dest, canvas.width, canvas.height, source.width(), source.height())
    else {
        return;
    };

    let mut scratch = I420ABuffer {
        base: I420Buffer::zeroed(clipped.width, clipped.height),
        alpha: vec![0u8; (clipped.width * clipped.height) as usize],
    };
    let scratch_rect = PixelRect::new(0, 0, clipped.width, clipped.height);
    scale_i420_into(&source.base, src_rect, &mut scratch.base, scratch_rect);
    scale_plane_into(
        &source.alpha,
        source.width(),
        src_rect,
        &mut scratch.alpha,
        clipped.width,
        scratch_rect,
    );
    blend_i420a_over(canvas, clipped, &scratch);
}

fn render_overlays_sorted_by_z(canvas: &mut I420Buffer, overlays: &[Overlay], area: PixelRect) {
    let mut order: Vec<&Overlay> = overlays.iter().collect();
    order.sort_by_key(|o| o.z);
    for overlay in order {
        render_overlay(canvas, overlay, area);
    }
}

/// The full per-tick pipeline (§4.3, data flow in §2): snapshot config,
/// check whether any bucket is due, composite the canvas, fan out.
fn run_tick(state: &Arc<GeneratorState>) {
    let tick = {
        let mut live = state.live.lock();
        promote_staged_config(state, &mut live);
        let tick = live.tick;
        live.tick = live.tick.wrapping_add(1);
        tick
    };

    if !state.registry.any_due(tick) {
        return;
    }

    let acquired = {
        let mut pool = state.canvas_pool.lock();
        pool.acquire(
            state.config.canvas.width,
            state.config.canvas.height,
            |canvas_mut| {
                let color = state.config.bg_color;
                canvas_mut.y.fill(color.y);
                canvas_mut.u.fill(color.cb);
                canvas_mut.v.fill(color.cr);

                // `state.live` is mutated only by this tick thread (never
                // contended), so the guard is held across rendering instead
                // of cloning the layout/overlay/text state out of it every
                // tick.
                let mut live = state.live.lock();
                if let Some(bg) = live.bg_image.as_ref() {
                    composite_background(canvas_mut, bg);
                }
                let tweened = tween_layout(&live.current_layout, &live.target_layout);
                live.current_layout = tweened;

                render_regions(state, canvas_mut, &live.current_layout);

                for ir in live.current_layout.iter().filter(|ir| ir.input >= 0) {
                    let Area::Rectangle(rect) = ir.region.area else {
                        continue;
                    };
                    let Some(overlays) = live.input_overlays.get(&ir.input) else {
                        continue;
                    };
                    let area = rect_to_canvas_pixels(rect, canvas_mut.width, canvas_mut.height);
                    if area.is_degenerate() {
                        continue;
                    }
                    render_overlays_sorted_by_z(canvas_mut, overlays, area);
                }

                let full_canvas = PixelRect::new(0, 0, canvas_mut.width, canvas_mut.height);
                render_overlays_sorted_by_z(canvas_mut, &live.overlays, full_canvas);

                if let Some(spec) = live.text.as_deref() {
                    state.text_drawer.draw(canvas_mut, spec);
                }
            },
        )
    };

    let canvas = match acquired {
        Some(canvas) => canvas,
        None => {
            error!("canvas pool exhausted, skipping tick {tick}");
            return;
        }
    };

    let timestamp_ms = state.clock.now_ms();
    let frame = ComposedFrame {
        width: canvas.width,
        height: canvas.height,
        timestamp_ms,
        timestamp_rtp_90khz: timestamp_ms * 90,
        payload: canvas,
    };

    state.registry.for_each_due_bucket(tick, |entries| {
        for (dst, _, _) in entries {
            dst.on_frame(&frame);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use compositor_pixels::DefaultImageDecoder;
    use compositor_types::{InputRegion, Region};
    use std::sync::Mutex as StdMutex;

    struct StubTextDrawer;
    impl TextDrawer for StubTextDrawer {
        fn draw(&self, _canvas: &mut I420Buffer, _spec: &str) {}
    }

    struct SingleFrameSource(compositor_types::FrameRef);
    impl InputSource for SingleFrameSource {
        fn get_frame(&self, input: i32) -> Option<compositor_types::FrameRef> {
            if input == 0 { Some(self.0.clone()) } else { None }
        }
    }

    struct CollectingDestination(StdMutex<Vec<ComposedFrame>>);
    impl Destination for CollectingDestination {
        fn on_frame(&self, frame: &ComposedFrame) {
            self.0.lock().unwrap().push(frame.clone());
        }
    }

    fn full_canvas_layout() -> LayoutSolution {
        vec![InputRegion::new(0, Region::rectangle("a", Rect::full()))]
    }

    #[test]
    fn scenario_s1_single_full_canvas_input() {
        let gray = 90u8;
        let source = Arc::new(SingleFrameSource(Arc::new(I420Buffer::filled(
            320, 180, gray, 100, 110,
        ))));
        let gen = FrameGenerator::new_for_test(
            VideoSize::new(640, 360),
            YuvColor::new(0, 128, 128),
            None,
            true,
            60,
            15,
            source,
            Arc::new(DefaultImageDecoder),
            Arc::new(StubTextDrawer),
            Arc::new(FakeClock::new()),
        );
        gen.update_layout_solution(full_canvas_layout());
        let dst = Arc::new(CollectingDestination(StdMutex::new(Vec::new())));
        let erased: Arc<dyn Destination> = dst.clone();
        assert!(gen.add_output(640, 360, 30, erased));

        // maxFps=60, subscriber at 30fps: bucket index i = 60/30 - 1 = 1,
        // due on ticks where tick mod 2 == 0: tick 0 is due, tick 1 is not.
        gen.tick_once();
        gen.tick_once();

        let frames = dst.0.lock().unwrap();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!((frame.width, frame.height), (640, 360));
        assert!(frame.payload.y.iter().all(|&v| v == gray));
    }

    #[test]
    fn scenario_s4_mixed_rate_fanout_counts() {
        let frame = Arc::new(I420Buffer::zeroed(4, 4));
        let source = Arc::new(SingleFrameSource(frame));
        let gen = FrameGenerator::new_for_test(
            VideoSize::new(4, 4),
            YuvColor::new(0, 128, 128),
            None,
            true,
            60,
            15,
            source,
            Arc::new(DefaultImageDecoder),
            Arc::new(StubTextDrawer),
            Arc::new(FakeClock::new()),
        );

        let d60 = Arc::new(CollectingDestination(StdMutex::new(Vec::new())));
        let d30 = Arc::new(CollectingDestination(StdMutex::new(Vec::new())));
        let d15 = Arc::new(CollectingDestination(StdMutex::new(Vec::new())));
        let a60: Arc<dyn Destination> = d60.clone();
        let a30: Arc<dyn Destination> = d30.clone();
        let a15: Arc<dyn Destination> = d15.clone();
        assert!(gen.add_output(4, 4, 60, a60));
        assert!(gen.add_output(4, 4, 30, a30));
        assert!(gen.add_output(4, 4, 15, a15));

        for _ in 0..60 {
            gen.tick_once();
        }

        assert_eq!(d60.0.lock().unwrap().len(), 60);
        assert_eq!(d30.0.lock().unwrap().len(), 30);
        assert_eq!(d15.0.lock().unwrap().len(), 15);
    }

    struct TwoInputSource {
        left: compositor_types::FrameRef,
        right: compositor_types::FrameRef,
    }
    impl InputSource for TwoInputSource {
        fn get_frame(&self, input: i32) -> Option<compositor_types::FrameRef> {
            match input {
                0 => Some(self.left.clone()),
                1 => Some(self.right.clone()),
                _ => None,
            }
        }
    }

    #[test]
    fn scenario_s2_two_tiles_side_by_side() {
        use compositor_types::Rational;

        let left_gray = 40u8;
        let right_gray = 210u8;
        let source = Arc::new(TwoInputSource {
            left: Arc::new(I420Buffer::filled(1280, 720, left_gray, 128, 128)),
            right: Arc::new(I420Buffer::filled(1280, 720, right_gray, 128, 128)),
        });
        let gen = FrameGenerator::new_for_test(
            VideoSize::new(1280, 720),
            YuvColor::new(0, 128, 128),
            None,
            false,
            60,
            15,
            source,
            Arc::new(DefaultImageDecoder),
            Arc::new(StubTextDrawer),
            Arc::new(FakeClock::new()),
        );
        gen.update_layout_solution(vec![
            InputRegion::new(
                0,
                Region::rectangle(
                    "left",
                    Rect::new(
                        Rational::zero(),
                        Rational::zero(),
                        Rational::new(1, 2),
                        Rational::whole(),
                    ),
                ),
            ),
            InputRegion::new(
                1,
                Region::rectangle(
                    "right",
                    Rect::new(
                        Rational::new(1, 2),
                        Rational::zero(),
                        Rational::new(1, 2),
                        Rational::whole(),
                    ),
                ),
            ),
        ]);
        let dst = Arc::new(CollectingDestination(StdMutex::new(Vec::new())));
        let erased: Arc<dyn Destination> = dst.clone();
        assert!(gen.add_output(1280, 720, 15, erased));
        gen.tick_once();

        let frames = dst.0.lock().unwrap();
        let frame = &frames[0];
        // The seam sits at x=640, already even. Source aspect (1280/720)
        // differs from each half's dest aspect (640/720), so letterboxing
        // shrinks the visible strip vertically; sample the vertical
        // center, which both halves always cover.
        let mid_row = frame.height / 2;
        let left_idx = (mid_row * frame.payload.y_stride + 10) as usize;
        let right_idx = (mid_row * frame.payload.y_stride + frame.width - 10) as usize;
        assert_eq!(frame.payload.y[left_idx], left_gray);
        assert_eq!(frame.payload.y[right_idx], right_gray);
    }

    #[test]
    fn overlay_y_axis_quirk_scales_by_area_width_not_height_conformance_pin() {
        // §9 open question: preserved as-is, not silently fixed. An area
        // that isn't square makes the bug observable: y/height below come
        // out scaled by the *width* (200), not the height (100).
        let overlay = Overlay::new(Vec::new(), 0, 0.1, 0.1, 0.2, 0.2);
        let area = PixelRect::new(0, 0, 200, 100);
        let dest = overlay_destination_rect(&overlay, area);
        assert_eq!(dest.x, 20);
        // If y were (correctly) scaled by height it would be 10, not 20.
        assert_eq!(dest.y, 20);
        assert_eq!(dest.width, 40);
        // If height were (correctly) scaled by height it would be 20, not 40.
        assert_eq!(dest.height, 40);
    }

    #[test]
    fn fps_ladder_that_never_reaches_max_is_clamped() {
        let source = Arc::new(SingleFrameSource(Arc::new(I420Buffer::zeroed(4, 4))));
        let gen = FrameGenerator::new_for_test(
            VideoSize::new(4, 4),
            YuvColor::new(0, 128, 128),
            None,
            true,
            50, // 15 -> 30 -> 60, never 50
            15,
            source,
            Arc::new(DefaultImageDecoder),
            Arc::new(StubTextDrawer),
            Arc::new(FakeClock::new()),
        );
        assert!(gen.is_supported(4, 4, 15));
        assert!(!gen.is_supported(4, 4, 50));
    }
}
