//! Selection manager tests
//!
//! State machine transitions, range normalization, notification diffing,
//! guard vetoes, and cross-grid sharing.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::rc::Rc;

use flashgrid::selection::{SelectionManager, SelectionRange};

/// Manager plus a shared counter of notifications it has fired.
fn counting_manager() -> (SelectionManager, Rc<RefCell<usize>>) {
    let mut manager = SelectionManager::new();
    let count = Rc::new(RefCell::new(0));
    let count_in_listener = Rc::clone(&count);
    manager.subscribe(Box::new(move |_| {
        *count_in_listener.borrow_mut() += 1;
    }));
    (manager, count)
}

// =============================================================================
// NORMALIZATION
// =============================================================================

#[test]
fn forward_drag_normalizes_to_itself() {
    let (mut manager, _) = counting_manager();
    manager.start(1, 2);
    manager.extend(3, 4);

    let n = manager.normalized().unwrap();
    assert_eq!((n.min_row, n.max_row, n.min_col, n.max_col), (1, 3, 2, 4));
}

#[test]
fn reverse_drag_normalizes_min_max() {
    let (mut manager, _) = counting_manager();
    manager.start(5, 4);
    manager.extend(2, 1);

    let n = manager.normalized().unwrap();
    assert_eq!((n.min_row, n.max_row, n.min_col, n.max_col), (2, 5, 1, 4));
}

#[test]
fn normalization_invariant_holds_for_any_drag_sequence() {
    let (mut manager, _) = counting_manager();
    manager.start(10, 10);
    for (r, c) in [(0, 20), (30, 0), (10, 10), (2, 2), (40, 40)] {
        manager.extend(r, c);
        let n = manager.normalized().unwrap();
        assert!(n.min_row <= n.max_row);
        assert!(n.min_col <= n.max_col);
    }
    manager.finish();
    let n = manager.normalized().unwrap();
    assert!(n.min_row <= n.max_row && n.min_col <= n.max_col);
}

#[test]
fn normalized_is_none_when_empty() {
    let manager = SelectionManager::new();
    assert!(manager.normalized().is_none());
    assert!(!manager.contains(0, 0));
}

#[test]
fn contains_checks_the_normalized_rectangle() {
    let (mut manager, _) = counting_manager();
    manager.start(4, 4);
    manager.extend(2, 2);

    assert!(manager.contains(3, 3));
    assert!(manager.contains(2, 4));
    assert!(!manager.contains(1, 3));
    assert!(!manager.contains(3, 5));
}

// =============================================================================
// NOTIFICATION DIFFING
// =============================================================================

#[test]
fn start_always_notifies() {
    let (mut manager, count) = counting_manager();
    manager.start(0, 0);
    manager.start(0, 0);
    assert_eq!(*count.borrow(), 2);
}

#[test]
fn extend_to_current_end_is_silent() {
    let (mut manager, count) = counting_manager();
    manager.start(1, 1);
    manager.extend(2, 2);
    let before = *count.borrow();

    manager.extend(2, 2);
    assert_eq!(*count.borrow(), before);

    manager.extend(2, 3);
    assert_eq!(*count.borrow(), before + 1);
}

#[test]
fn extend_on_empty_is_a_no_op() {
    let (mut manager, count) = counting_manager();
    manager.extend(3, 3);
    assert_eq!(*count.borrow(), 0);
    assert!(manager.normalized().is_none());
}

#[test]
fn extend_to_notifies_even_when_unchanged() {
    let (mut manager, count) = counting_manager();
    manager.start(1, 1);
    manager.extend_to(1, 1);
    manager.extend_to(1, 1);
    assert_eq!(*count.borrow(), 3);

    // The anchor survives shift-extension.
    manager.extend_to(5, 5);
    let range = manager.range().unwrap();
    assert_eq!((range.start_row, range.start_col), (1, 1));
    assert_eq!((range.end_row, range.end_col), (5, 5));
}

#[test]
fn set_range_twice_with_the_same_value_fires_once() {
    let (mut manager, count) = counting_manager();
    let range = SelectionRange {
        start_row: 1,
        start_col: 2,
        end_row: 3,
        end_col: 4,
    };
    manager.set_range(Some(range));
    manager.set_range(Some(range));
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn set_range_diffs_each_coordinate() {
    let (mut manager, count) = counting_manager();
    let range = SelectionRange {
        start_row: 1,
        start_col: 2,
        end_row: 3,
        end_col: 4,
    };
    manager.set_range(Some(range));
    manager.set_range(Some(SelectionRange {
        end_col: 5,
        ..range
    }));
    assert_eq!(*count.borrow(), 2);
}

#[test]
fn set_range_null_transition_notifies_once() {
    let (mut manager, count) = counting_manager();
    manager.set_range(None);
    assert_eq!(*count.borrow(), 0);

    manager.start(0, 0);
    let before = *count.borrow();
    manager.set_range(None);
    manager.set_range(None);
    assert_eq!(*count.borrow(), before + 1);
    assert!(manager.normalized().is_none());
}

#[test]
fn clear_notifies_only_on_a_real_transition() {
    let (mut manager, count) = counting_manager();
    manager.clear();
    assert_eq!(*count.borrow(), 0);

    manager.start(2, 2);
    let before = *count.borrow();
    manager.clear();
    manager.clear();
    assert_eq!(*count.borrow(), before + 1);
}

// =============================================================================
// DRAGGING FLAG
// =============================================================================

#[test]
fn finish_clears_dragging_without_notifying() {
    let (mut manager, count) = counting_manager();
    manager.start(1, 1);
    assert!(manager.is_dragging());
    let before = *count.borrow();

    manager.finish();
    assert!(!manager.is_dragging());
    assert_eq!(*count.borrow(), before);

    // The selection itself survives the finish.
    assert!(manager.normalized().is_some());
}

#[test]
fn finish_on_empty_is_harmless() {
    let (mut manager, count) = counting_manager();
    manager.finish();
    assert!(!manager.is_dragging());
    assert_eq!(*count.borrow(), 0);
}

// =============================================================================
// GUARD
// =============================================================================

#[test]
fn guard_veto_discards_the_change_silently() {
    let (mut manager, count) = counting_manager();
    manager.start(1, 1);
    let before = *count.borrow();

    // Reject every pending change from here on.
    manager.set_guard(Some(Box::new(|_| false)));
    manager.extend(5, 5);
    manager.clear();
    manager.set_range(None);

    assert_eq!(*count.borrow(), before);
    let n = manager.normalized().unwrap();
    assert_eq!((n.min_row, n.max_row, n.min_col, n.max_col), (1, 1, 1, 1));
}

#[test]
fn guard_sees_the_pending_range() {
    let mut manager = SelectionManager::new();
    // Cap selections at row 10.
    manager.set_guard(Some(Box::new(|pending| {
        pending.is_none_or(|r| r.end_row <= 10)
    })));

    manager.start(2, 0);
    manager.extend(20, 0);
    assert_eq!(manager.range().unwrap().end_row, 2);

    manager.extend(8, 0);
    assert_eq!(manager.range().unwrap().end_row, 8);
}

// =============================================================================
// SHARED INSTANCES
// =============================================================================

#[test]
fn shared_handle_synchronizes_observers() {
    let shared = SelectionManager::new().into_shared();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_a = Rc::clone(&seen);
    shared.borrow_mut().subscribe(Box::new(move |range| {
        seen_a.borrow_mut().push(("a", range.copied()));
    }));
    let seen_b = Rc::clone(&seen);
    shared.borrow_mut().subscribe(Box::new(move |range| {
        seen_b.borrow_mut().push(("b", range.copied()));
    }));

    shared.borrow_mut().start(3, 3);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1, seen[1].1);
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut manager = SelectionManager::new();
    let count = Rc::new(RefCell::new(0));
    let count_in_listener = Rc::clone(&count);
    let id = manager.subscribe(Box::new(move |_| {
        *count_in_listener.borrow_mut() += 1;
    }));

    manager.start(0, 0);
    manager.unsubscribe(id);
    manager.extend(1, 1);
    assert_eq!(*count.borrow(), 1);
}
