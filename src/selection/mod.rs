//! Selection-range state machine.
//!
//! One manager instance is normally owned exclusively by one grid. Sharing a
//! single [`SharedSelection`] handle across grids is the supported way to get
//! synchronized multi-grid selection: every sharer observes identical state
//! and notifications.

pub mod clipboard;

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use clipboard::build_tsv;
#[cfg(target_arch = "wasm32")]
pub use clipboard::ClipboardWriter;

/// Anchored selection rectangle. Start is the anchor, end the active corner;
/// either may be the larger coordinate while dragging backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl SelectionRange {
    /// Single-cell range anchored at (row, col).
    pub fn cell(row: u32, col: u32) -> Self {
        Self {
            start_row: row,
            start_col: col,
            end_row: row,
            end_col: col,
        }
    }

    /// Min/max bounds regardless of drag direction.
    pub fn normalized(&self) -> NormalizedRange {
        NormalizedRange {
            min_row: self.start_row.min(self.end_row),
            max_row: self.start_row.max(self.end_row),
            min_col: self.start_col.min(self.end_col),
            max_col: self.start_col.max(self.end_col),
        }
    }
}

/// A selection with `min ≤ max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRange {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl NormalizedRange {
    /// True when (row, col) falls inside the rectangle.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }
}

/// Change listener; receives the new anchored range (`None` = cleared).
pub type SelectionListener = Box<dyn FnMut(Option<&SelectionRange>)>;

/// Optional veto predicate over a pending range change.
pub type SelectionGuard = Box<dyn Fn(Option<&SelectionRange>) -> bool>;

/// Token returned by [`SelectionManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Shared-ownership handle for deliberate cross-grid synchronization.
pub type SharedSelection = Rc<RefCell<SelectionManager>>;

/// Drag-range state machine: empty / active, with an orthogonal dragging
/// flag while active.
#[derive(Default)]
pub struct SelectionManager {
    range: Option<SelectionRange>,
    dragging: bool,
    guard: Option<SelectionGuard>,
    listeners: Vec<(SubscriptionId, SelectionListener)>,
    next_subscription: u64,
}

impl SelectionManager {
    /// Empty manager, no listeners, no guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into the shared handle used for multi-grid synchronization.
    pub fn into_shared(self) -> SharedSelection {
        Rc::new(RefCell::new(self))
    }

    /// Current anchored range, `None` when empty.
    pub fn range(&self) -> Option<&SelectionRange> {
        self.range.as_ref()
    }

    /// Current normalized range, `None` when empty.
    pub fn normalized(&self) -> Option<NormalizedRange> {
        self.range.map(|r| r.normalized())
    }

    /// Membership against the normalized range; false when empty.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.normalized().is_some_and(|n| n.contains(row, col))
    }

    /// True between `start` and `finish`.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Install the veto predicate; a rejected change is silently discarded.
    pub fn set_guard(&mut self, guard: Option<SelectionGuard>) {
        self.guard = guard;
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: SelectionListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Remove a listener; unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    fn allowed(&self, pending: Option<&SelectionRange>) -> bool {
        match &self.guard {
            Some(guard) => guard(pending),
            None => true,
        }
    }

    fn notify(&mut self) {
        let snapshot = self.range;
        for (_, listener) in &mut self.listeners {
            listener(snapshot.as_ref());
        }
    }

    /// Begin a drag selection at (row, col): anchor = end = (row, col).
    /// Always notifies.
    pub fn start(&mut self, row: u32, col: u32) {
        let pending = SelectionRange::cell(row, col);
        if !self.allowed(Some(&pending)) {
            return;
        }
        self.range = Some(pending);
        self.dragging = true;
        self.notify();
    }

    /// Move the active corner during a drag. No-op when empty or when
    /// (row, col) already is the end; notifies otherwise.
    pub fn extend(&mut self, row: u32, col: u32) {
        let Some(current) = self.range else {
            return;
        };
        if current.end_row == row && current.end_col == col {
            return;
        }
        let pending = SelectionRange {
            end_row: row,
            end_col: col,
            ..current
        };
        if !self.allowed(Some(&pending)) {
            return;
        }
        self.range = Some(pending);
        self.notify();
    }

    /// End the drag. Only clears the dragging flag; never notifies.
    pub fn finish(&mut self) {
        self.dragging = false;
    }

    /// Shift-click: keep the anchor, move the end. No-op when empty.
    /// Always notifies, even when the end is unchanged.
    pub fn extend_to(&mut self, row: u32, col: u32) {
        let Some(current) = self.range else {
            return;
        };
        let pending = SelectionRange {
            end_row: row,
            end_col: col,
            ..current
        };
        if !self.allowed(Some(&pending)) {
            return;
        }
        self.range = Some(pending);
        self.notify();
    }

    /// Full replace from outside. Diffs against current state and notifies
    /// only on an actual change.
    pub fn set_range(&mut self, range: Option<SelectionRange>) {
        if self.range == range {
            return;
        }
        if !self.allowed(range.as_ref()) {
            return;
        }
        self.range = range;
        if self.range.is_none() {
            self.dragging = false;
        }
        self.notify();
    }

    /// Drop the selection. No-op when already empty; notifies on the real
    /// transition.
    pub fn clear(&mut self) {
        if self.range.is_none() {
            return;
        }
        if !self.allowed(None) {
            return;
        }
        self.range = None;
        self.dragging = false;
        self.notify();
    }
}
