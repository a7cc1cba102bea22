//! Raw input → semantic grid events.
//!
//! The manager core is target-independent: every entry point takes the
//! current record buffer (re-fetched by the caller each event, never cached
//! here) plus the handler table, and runs the gesture machines. The wasm
//! listener glue lives in [`dom`].
//!
//! Dispatch order for every input: raw observer first (an explicit cancel
//! skips the manager's own handling of that input entirely), then
//! hit-testing and the semantic handler. Misses and empty layouts resolve to
//! [`HitResult::Miss`]; nothing here errors on data-driven conditions.

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod gesture;

use crate::layout::record::{hit_test, nearest_record, RecordBuffer};
use crate::types::{HitResult, RecordRange};

pub use gesture::{
    DragMachine, DragMotion, TouchMachine, TouchMotion, TouchRelease, DOUBLE_TAP_SLOP_PX,
    DOUBLE_TAP_WINDOW_MS, DRAG_THRESHOLD_PX, LONG_PRESS_MS, TAP_SLOP_PX,
};
#[cfg(target_arch = "wasm32")]
pub use dom::{JsHandlerTable, LayoutProvider, SurfaceBinding};

/// Handle to the originating platform event, carried on every dispatch.
#[cfg(target_arch = "wasm32")]
pub type NativeHandle = wasm_bindgen::JsValue;
/// Handle to the originating platform event (unit off-wasm).
#[cfg(not(target_arch = "wasm32"))]
pub type NativeHandle = ();

/// Which input produced a dispatch; the raw observer keys off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Click,
    DoubleClick,
    ContextMenu,
    Wheel,
    KeyDown,
    TouchStart,
    TouchMove,
    TouchEnd,
}

/// Payload for cell/header-level semantic events.
#[derive(Debug, Clone)]
pub struct GridEvent {
    /// What the input resolved to against the current layout.
    pub hit: HitResult,
    /// Position relative to the surface, scroll-independent.
    pub viewport_x: f32,
    pub viewport_y: f32,
    /// Position in the dataset's horizontal space (viewport + scroll).
    pub content_x: f32,
    pub content_y: f32,
    /// The originating platform event, when one exists.
    pub native: Option<NativeHandle>,
}

/// Payload for scroll dispatches (wheel or touch pan).
#[derive(Debug, Clone)]
pub struct ScrollEvent {
    pub delta_x: f32,
    pub delta_y: f32,
    pub native: Option<NativeHandle>,
}

/// Payload for key dispatches.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub native: Option<NativeHandle>,
}

/// What the raw observer saw, before any default handling.
#[derive(Debug, Clone)]
pub struct RawDispatch {
    pub kind: InputKind,
    pub hit: HitResult,
    pub viewport_x: f32,
    pub viewport_y: f32,
    pub content_x: f32,
    pub content_y: f32,
    pub native: Option<NativeHandle>,
}

/// Raw-observer verdict for one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// Run the manager's default handling.
    #[default]
    Continue,
    /// Skip default handling for this input only.
    Cancel,
}

/// Raw observer: sees every input ahead of default handling.
pub type RawObserver = Box<dyn FnMut(&RawDispatch) -> Dispatch>;

/// Semantic event sinks. Default implementations ignore everything, so a
/// handler table implements only what it consumes.
#[allow(unused_variables)]
pub trait GridHandlers {
    fn on_cell_click(&mut self, event: &GridEvent) {}
    fn on_cell_double_click(&mut self, event: &GridEvent) {}
    fn on_cell_mouse_down(&mut self, event: &GridEvent) {}
    fn on_cell_mouse_move(&mut self, event: &GridEvent) {}
    fn on_cell_mouse_up(&mut self, event: &GridEvent) {}
    fn on_header_click(&mut self, event: &GridEvent) {}
    fn on_context_menu(&mut self, event: &GridEvent) {}
    fn on_scroll(&mut self, event: &ScrollEvent) {}
    fn on_key_down(&mut self, event: &KeyEvent) {}
    fn on_touch_start(&mut self, event: &GridEvent) {}
    fn on_touch_move(&mut self, event: &GridEvent) {}
    fn on_touch_end(&mut self, event: &GridEvent) {}
}

/// Input → semantic-event translation for one rendering surface.
#[derive(Default)]
pub struct EventManager {
    headers: RecordRange,
    data: RecordRange,
    scroll_x: f32,
    drag: DragMachine,
    touch: TouchMachine,
    last_move: Option<(f32, f32)>,
    raw_observer: Option<RawObserver>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the header/data record ranges after the engine republishes.
    pub fn set_layouts(&mut self, headers: RecordRange, data: RecordRange) {
        self.headers = headers;
        self.data = data;
    }

    /// Horizontal scroll offset used for viewport → content correction.
    pub fn set_scroll_offset(&mut self, x: f32) {
        self.scroll_x = x;
    }

    /// Install or remove the raw observer.
    pub fn set_raw_observer(&mut self, observer: Option<RawObserver>) {
        self.raw_observer = observer;
    }

    fn content_x(&self, viewport_x: f32) -> f32 {
        viewport_x + self.scroll_x
    }

    /// Header range first (short-circuits on hit), then data; miss on both
    /// is an explicit [`HitResult::Miss`].
    fn hit_at(&self, records: &dyn RecordBuffer, x: f32, y: f32) -> HitResult {
        let cx = self.content_x(x);
        if let Some(hit) = hit_test(records, self.headers, cx, y) {
            return HitResult::Header(hit);
        }
        match hit_test(records, self.data, cx, y) {
            Some(hit) => HitResult::Cell(hit),
            None => HitResult::Miss,
        }
    }

    /// Data hit with nearest-record fallback, for drag moves that leave the
    /// data area.
    fn data_hit_or_nearest(&self, records: &dyn RecordBuffer, x: f32, y: f32) -> HitResult {
        let cx = self.content_x(x);
        match hit_test(records, self.data, cx, y) {
            Some(hit) => HitResult::Cell(hit),
            None => match nearest_record(records, self.data, cx, y) {
                Some(hit) => HitResult::Cell(hit),
                None => HitResult::Miss,
            },
        }
    }

    /// Re-hit-test the last stored move position against *current* layouts.
    ///
    /// Refreshes the logical hovered cell after a layout change without
    /// waiting for a new move event. Miss when no move was recorded.
    pub fn hit_test_at_last_pos(&self, records: &dyn RecordBuffer) -> HitResult {
        match self.last_move {
            Some((x, y)) => self.hit_at(records, x, y),
            None => HitResult::Miss,
        }
    }

    fn observe(
        &mut self,
        kind: InputKind,
        hit: HitResult,
        x: f32,
        y: f32,
        native: Option<&NativeHandle>,
    ) -> Dispatch {
        let content_x = self.content_x(x);
        let Some(observer) = self.raw_observer.as_mut() else {
            return Dispatch::Continue;
        };
        let raw = RawDispatch {
            kind,
            hit,
            viewport_x: x,
            viewport_y: y,
            content_x,
            content_y: y,
            native: native.cloned(),
        };
        observer(&raw)
    }

    fn grid_event(&self, hit: HitResult, x: f32, y: f32, native: Option<NativeHandle>) -> GridEvent {
        GridEvent {
            hit,
            viewport_x: x,
            viewport_y: y,
            content_x: self.content_x(x),
            content_y: y,
            native,
        }
    }

    /// Mouse down. Records the drag origin for the primary button and
    /// dispatches a cell mouse-down on a data hit.
    pub fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        primary: bool,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::PointerDown, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return;
        }
        // A fresh gesture invalidates whatever position the last one left.
        self.last_move = None;
        if !primary {
            return;
        }
        self.drag.begin(x, y);
        if let HitResult::Cell(_) = hit {
            handlers.on_cell_mouse_down(&self.grid_event(hit, x, y, native));
        }
    }

    /// Mouse move. Ignored without a held primary button and an origin
    /// recorded on this surface; suppressed until the drag threshold is
    /// exceeded; afterwards every move dispatches, snapping to the nearest
    /// data record outside the data area.
    pub fn pointer_move(
        &mut self,
        x: f32,
        y: f32,
        primary_held: bool,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::PointerMove, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return;
        }
        self.last_move = Some((x, y));
        if !primary_held || !self.drag.is_active() {
            return;
        }
        match self.drag.motion(x, y) {
            DragMotion::Ignored | DragMotion::Suppressed => {}
            DragMotion::Moved => {
                let hit = self.data_hit_or_nearest(records, x, y);
                handlers.on_cell_mouse_move(&self.grid_event(hit, x, y, native));
            }
        }
    }

    /// Mouse up. Fires only when a matching down was recorded; always clears
    /// the drag session.
    pub fn pointer_up(
        &mut self,
        x: f32,
        y: f32,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::PointerUp, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            self.drag.cancel();
            return;
        }
        if self.drag.release() {
            handlers.on_cell_mouse_up(&self.grid_event(hit, x, y, native));
        }
    }

    /// Click: header first, then cell; a miss dispatches nothing.
    pub fn click(
        &mut self,
        x: f32,
        y: f32,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::Click, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return;
        }
        match hit {
            HitResult::Header(_) => handlers.on_header_click(&self.grid_event(hit, x, y, native)),
            HitResult::Cell(_) => handlers.on_cell_click(&self.grid_event(hit, x, y, native)),
            HitResult::Miss => {}
        }
    }

    /// Native double-click on a data cell.
    pub fn double_click(
        &mut self,
        x: f32,
        y: f32,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::DoubleClick, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return;
        }
        if let HitResult::Cell(_) = hit {
            handlers.on_cell_double_click(&self.grid_event(hit, x, y, native));
        }
    }

    /// Context menu at a point; dispatched with whatever the point hit.
    pub fn context_menu(
        &mut self,
        x: f32,
        y: f32,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::ContextMenu, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return;
        }
        handlers.on_context_menu(&self.grid_event(hit, x, y, native));
    }

    /// Wheel input → scroll dispatch.
    pub fn wheel(
        &mut self,
        delta_x: f32,
        delta_y: f32,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        if self.observe(InputKind::Wheel, HitResult::Miss, 0.0, 0.0, native.as_ref())
            == Dispatch::Cancel
        {
            return;
        }
        handlers.on_scroll(&ScrollEvent {
            delta_x,
            delta_y,
            native,
        });
    }

    /// Key down with modifier flags.
    pub fn key_down(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        if self.observe(InputKind::KeyDown, HitResult::Miss, 0.0, 0.0, native.as_ref())
            == Dispatch::Cancel
        {
            return;
        }
        handlers.on_key_down(&KeyEvent {
            key: key.to_string(),
            ctrl,
            shift,
            alt,
            meta,
            native,
        });
    }

    /// Touch down. Returns true when the caller should arm the long-press
    /// timer; anything but a clean single-finger start cancels the gesture.
    pub fn touch_start(
        &mut self,
        x: f32,
        y: f32,
        touch_count: u32,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) -> bool {
        if touch_count != 1 {
            self.touch.cancel();
            return false;
        }
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::TouchStart, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return false;
        }
        self.last_move = Some((x, y));
        self.touch.begin(x, y);
        handlers.on_touch_start(&self.grid_event(hit, x, y, native));
        true
    }

    /// Long-press timer fired: promote the pending tap into a selection
    /// drag and synthesize the mouse-down.
    pub fn long_press_fired(
        &mut self,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
    ) {
        let Some(origin) = self.touch.promote_long_press() else {
            return;
        };
        let hit = self.data_hit_or_nearest(records, origin.x, origin.y);
        if let HitResult::Cell(_) = hit {
            handlers.on_cell_mouse_down(&self.grid_event(hit, origin.x, origin.y, None));
        }
    }

    /// Finger move: pan scroll, drag extension, or nothing while the tap
    /// slop still holds.
    pub fn touch_move(
        &mut self,
        x: f32,
        y: f32,
        touch_count: u32,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        if touch_count != 1 {
            self.touch.cancel();
            return;
        }
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::TouchMove, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return;
        }
        self.last_move = Some((x, y));
        handlers.on_touch_move(&self.grid_event(hit, x, y, native.clone()));
        match self.touch.motion(x, y) {
            TouchMotion::Ignored => {}
            TouchMotion::PanBy { delta_x, delta_y } => {
                handlers.on_scroll(&ScrollEvent {
                    delta_x,
                    delta_y,
                    native,
                });
            }
            TouchMotion::DragTo { x, y } => {
                let hit = self.data_hit_or_nearest(records, x, y);
                handlers.on_cell_mouse_move(&self.grid_event(hit, x, y, native));
            }
        }
    }

    /// Finger lifted: resolve tap / double-tap / drag-end / pan-end. The
    /// caller cancels the long-press timer around this call.
    pub fn touch_end(
        &mut self,
        now_ms: f64,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let release = self.touch.end(now_ms);
        if matches!(release, TouchRelease::Ignored) {
            return;
        }
        let (x, y) = match release {
            TouchRelease::Tap { x, y } | TouchRelease::DoubleTap { x, y } => (x, y),
            _ => self.last_move.unwrap_or((0.0, 0.0)),
        };
        let hit = self.hit_at(records, x, y);
        if self.observe(InputKind::TouchEnd, hit, x, y, native.as_ref()) == Dispatch::Cancel {
            return;
        }
        handlers.on_touch_end(&self.grid_event(hit, x, y, native.clone()));
        match release {
            TouchRelease::Ignored | TouchRelease::EndPan => {}
            TouchRelease::Tap { x, y } => self.dispatch_tap(x, y, false, records, handlers, native),
            TouchRelease::DoubleTap { x, y } => {
                self.dispatch_tap(x, y, true, records, handlers, native);
            }
            TouchRelease::EndDrag => {
                let hit = self.data_hit_or_nearest(records, x, y);
                handlers.on_cell_mouse_up(&self.grid_event(hit, x, y, native));
            }
        }
    }

    /// Gesture abandoned by the platform.
    pub fn touch_cancel(&mut self) {
        self.touch.cancel();
    }

    /// Abandon every in-flight gesture (detach, listener teardown).
    pub fn cancel_gestures(&mut self) {
        self.drag.cancel();
        self.touch.cancel();
        self.last_move = None;
    }

    fn dispatch_tap(
        &mut self,
        x: f32,
        y: f32,
        double: bool,
        records: &dyn RecordBuffer,
        handlers: &mut dyn GridHandlers,
        native: Option<NativeHandle>,
    ) {
        let hit = self.hit_at(records, x, y);
        match hit {
            HitResult::Header(_) => {
                handlers.on_header_click(&self.grid_event(hit, x, y, native));
            }
            HitResult::Cell(_) => {
                // Taps double as selection input: synthesize the down/up
                // pair before the click itself.
                handlers.on_cell_mouse_down(&self.grid_event(hit, x, y, native.clone()));
                handlers.on_cell_mouse_up(&self.grid_event(hit, x, y, native.clone()));
                if double {
                    handlers.on_cell_double_click(&self.grid_event(hit, x, y, native));
                } else {
                    handlers.on_cell_click(&self.grid_event(hit, x, y, native));
                }
            }
            HitResult::Miss => {}
        }
    }
}
