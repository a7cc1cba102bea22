//! Per-gesture state machines for mouse drags and touch input.
//!
//! Each gesture is an explicit state enum; a session's state lives from
//! pointer/touch-down to up/cancel and is never shared across gestures.
//! Timers (long-press) are owned by the wasm binding layer; the machines
//! only track what a fired or cancelled timer means for the gesture.

/// Displacement before a mouse down+move becomes a drag.
pub const DRAG_THRESHOLD_PX: f32 = 3.0;

/// Displacement budget for a touch to still count as a tap.
pub const TAP_SLOP_PX: f32 = 8.0;

/// Two taps within this window and [`DOUBLE_TAP_SLOP_PX`] form a double-tap.
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;

/// Spatial window for double-tap detection.
pub const DOUBLE_TAP_SLOP_PX: f32 = 24.0;

/// Hold duration that promotes a touch to a selection drag.
pub const LONG_PRESS_MS: f64 = 500.0;

/// A viewport-space point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum DragPhase {
    #[default]
    Idle,
    /// Down recorded, threshold not yet exceeded.
    Armed { origin: Point },
    Dragging,
}

/// What a mouse move means for the current drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMotion {
    /// No origin on this surface; the move is not ours.
    Ignored,
    /// Origin recorded but displacement still under the threshold.
    Suppressed,
    /// Past the threshold; every such move is dispatched.
    Moved,
}

/// Mouse drag session: idle → armed → dragging.
#[derive(Debug, Default)]
pub struct DragMachine {
    phase: DragPhase,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the drag origin for a primary-button down.
    pub fn begin(&mut self, x: f32, y: f32) {
        self.phase = DragPhase::Armed {
            origin: Point::new(x, y),
        };
    }

    /// Classify a move against the session state.
    pub fn motion(&mut self, x: f32, y: f32) -> DragMotion {
        match self.phase {
            DragPhase::Idle => DragMotion::Ignored,
            DragPhase::Armed { origin } => {
                if origin.distance_to(Point::new(x, y)) > DRAG_THRESHOLD_PX {
                    self.phase = DragPhase::Dragging;
                    DragMotion::Moved
                } else {
                    DragMotion::Suppressed
                }
            }
            DragPhase::Dragging => DragMotion::Moved,
        }
    }

    /// Close the session; true when a matching down was recorded.
    pub fn release(&mut self) -> bool {
        let had_origin = !matches!(self.phase, DragPhase::Idle);
        self.phase = DragPhase::Idle;
        had_origin
    }

    /// Abandon the session without an up.
    pub fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }

    /// True from down until release/cancel.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, DragPhase::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum TouchPhase {
    #[default]
    Idle,
    /// Single finger down, still within the tap slop, long-press pending.
    PendingTap { origin: Point },
    /// Slop exceeded before long-press fired: the gesture is a pan.
    Panning { last: Point },
    /// Long-press fired first: the gesture is a selection drag.
    DragSelecting,
}

/// What a touch move means for the current gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchMotion {
    /// No single-finger gesture in flight, or still within the tap slop.
    Ignored,
    /// Pan scroll by the negated finger displacement.
    PanBy { delta_x: f32, delta_y: f32 },
    /// Promoted drag: extend the selection toward this point.
    DragTo { x: f32, y: f32 },
}

/// What lifting the finger means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchRelease {
    /// No gesture was in flight.
    Ignored,
    /// Tap at the origin point.
    Tap { x: f32, y: f32 },
    /// Second tap within the time/distance window.
    DoubleTap { x: f32, y: f32 },
    /// End of a promoted selection drag.
    EndDrag,
    /// End of a pan; no click fires.
    EndPan,
}

/// Touch gesture session: idle → pending-tap → {tap | double-tap |
/// promoted-drag | panning}.
#[derive(Debug, Default)]
pub struct TouchMachine {
    phase: TouchPhase,
    last_tap: Option<(f64, Point)>,
}

impl TouchMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-finger down. The caller arms the long-press timer.
    pub fn begin(&mut self, x: f32, y: f32) {
        self.phase = TouchPhase::PendingTap {
            origin: Point::new(x, y),
        };
    }

    /// Long-press timer fired. Returns the origin to promote into a
    /// selection drag, or `None` when the gesture already resolved.
    pub fn promote_long_press(&mut self) -> Option<Point> {
        match self.phase {
            TouchPhase::PendingTap { origin } => {
                self.phase = TouchPhase::DragSelecting;
                Some(origin)
            }
            _ => None,
        }
    }

    /// Classify a finger move.
    pub fn motion(&mut self, x: f32, y: f32) -> TouchMotion {
        let point = Point::new(x, y);
        match self.phase {
            TouchPhase::Idle => TouchMotion::Ignored,
            TouchPhase::PendingTap { origin } => {
                if origin.distance_to(point) > TAP_SLOP_PX {
                    self.phase = TouchPhase::Panning { last: point };
                    TouchMotion::PanBy {
                        delta_x: origin.x - point.x,
                        delta_y: origin.y - point.y,
                    }
                } else {
                    TouchMotion::Ignored
                }
            }
            TouchPhase::Panning { last } => {
                self.phase = TouchPhase::Panning { last: point };
                TouchMotion::PanBy {
                    delta_x: last.x - point.x,
                    delta_y: last.y - point.y,
                }
            }
            TouchPhase::DragSelecting => TouchMotion::DragTo { x, y },
        }
    }

    /// Finger lifted. Resolves tap vs double-tap via the time+distance
    /// window; the caller cancels the long-press timer.
    pub fn end(&mut self, now_ms: f64) -> TouchRelease {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            TouchPhase::Idle => TouchRelease::Ignored,
            TouchPhase::PendingTap { origin } => {
                let double = self.last_tap.is_some_and(|(at, point)| {
                    now_ms - at <= DOUBLE_TAP_WINDOW_MS
                        && point.distance_to(origin) <= DOUBLE_TAP_SLOP_PX
                });
                if double {
                    self.last_tap = None;
                    TouchRelease::DoubleTap {
                        x: origin.x,
                        y: origin.y,
                    }
                } else {
                    self.last_tap = Some((now_ms, origin));
                    TouchRelease::Tap {
                        x: origin.x,
                        y: origin.y,
                    }
                }
            }
            TouchPhase::Panning { .. } => TouchRelease::EndPan,
            TouchPhase::DragSelecting => TouchRelease::EndDrag,
        }
    }

    /// Abandon the gesture (touch-cancel, extra fingers, detach).
    pub fn cancel(&mut self) {
        self.phase = TouchPhase::Idle;
    }

    /// True while a long-press would still change the gesture's meaning.
    pub fn long_press_pending(&self) -> bool {
        matches!(self.phase, TouchPhase::PendingTap { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn drag_crosses_the_threshold_once() {
        let mut drag = DragMachine::new();
        assert_eq!(drag.motion(10.0, 10.0), DragMotion::Ignored);

        drag.begin(10.0, 10.0);
        assert_eq!(drag.motion(11.0, 10.0), DragMotion::Suppressed);
        assert_eq!(drag.motion(20.0, 10.0), DragMotion::Moved);
        // Once dragging, even a return to the origin keeps firing.
        assert_eq!(drag.motion(10.0, 10.0), DragMotion::Moved);

        assert!(drag.release());
        assert!(!drag.release());
    }

    #[test]
    fn touch_slop_turns_the_gesture_into_a_pan() {
        let mut touch = TouchMachine::new();
        touch.begin(50.0, 50.0);
        assert_eq!(touch.motion(52.0, 50.0), TouchMotion::Ignored);
        assert_eq!(
            touch.motion(50.0, 70.0),
            TouchMotion::PanBy {
                delta_x: 0.0,
                delta_y: -20.0
            }
        );
        assert_eq!(touch.end(100.0), TouchRelease::EndPan);
    }

    #[test]
    fn promotion_loses_the_race_once_the_finger_lifts() {
        let mut touch = TouchMachine::new();
        touch.begin(50.0, 50.0);
        assert!(touch.long_press_pending());
        assert!(matches!(touch.end(10.0), TouchRelease::Tap { .. }));
        assert!(touch.promote_long_press().is_none());
    }

    #[test]
    fn double_tap_needs_both_time_and_distance() {
        let mut touch = TouchMachine::new();
        touch.begin(50.0, 50.0);
        assert!(matches!(touch.end(0.0), TouchRelease::Tap { .. }));

        // In time, but too far away.
        touch.begin(200.0, 50.0);
        assert!(matches!(touch.end(100.0), TouchRelease::Tap { .. }));

        // Close by and inside the window.
        touch.begin(201.0, 51.0);
        assert!(matches!(touch.end(200.0), TouchRelease::DoubleTap { .. }));
    }

    #[test]
    fn cancel_leaves_no_tap_behind() {
        let mut touch = TouchMachine::new();
        touch.begin(50.0, 50.0);
        touch.cancel();
        assert_eq!(touch.end(10.0), TouchRelease::Ignored);
    }
}
