//! Cursors survive mutations that leave their slot alone and report
//! staleness after mutations that move or destroy it.

use std::panic::{catch_unwind, AssertUnwindSafe};

use stave_core::{CursorState, StaveError};
use stave_seq::Stave;

/// Panics when the element tagged `fuse` is dropped.
#[derive(Debug)]
struct Fused {
    tag: i32,
    fuse: i32,
}

impl Drop for Fused {
    fn drop(&mut self) {
        if self.tag == self.fuse && !std::thread::panicking() {
            panic!("destructor of {} failed", self.tag);
        }
    }
}

fn fused(n: i32, fuse: i32) -> Stave<Fused> {
    let mut s = Stave::with_capacity(16).unwrap();
    for tag in 0..n {
        s.push(Fused { tag, fuse }).unwrap();
    }
    s
}

fn tags(s: &Stave<Fused>) -> Vec<i32> {
    s.iter().map(|f| f.tag).collect()
}

fn roomy(n: i32) -> Stave<i32> {
    let mut s = Stave::with_capacity(64).unwrap();
    s.extend_from_slice(&(0..n).collect::<Vec<_>>()).unwrap();
    s
}

#[test]
fn walk_and_edit_with_cursors() {
    let mut s = roomy(6);
    let mut c = s.begin();
    // Drop every even value, stepping with the fresh cursors returned.
    while c != s.end() {
        if *s.resolve(&c).unwrap() % 2 == 0 {
            let (_, next) = s.erase_at_cursor(&c).unwrap();
            c = next;
        } else {
            c = c.forward(1).unwrap();
        }
    }
    assert_eq!(s, [1, 3, 5]);
}

#[test]
fn erase_stales_only_shifted_cursors() {
    let mut s = roomy(10);
    let low = s.cursor(2).unwrap();
    let high = s.cursor(8).unwrap();
    s.erase_range(5..7).unwrap();
    assert_eq!(*s.resolve(&low).unwrap(), 2);
    assert!(matches!(
        s.resolve(&high),
        Err(StaveError::StaleCursor { offset: 8, .. })
    ));
}

#[test]
fn truncate_stales_the_cut_tail() {
    let mut s = roomy(5);
    let kept = s.cursor(1).unwrap();
    let cut = s.cursor(4).unwrap();
    s.truncate(3);
    assert_eq!(s.cursor_state(&kept), CursorState::Valid);
    assert_eq!(s.cursor_state(&cut), CursorState::Invalidated);
}

#[test]
fn growth_relocation_stales_all() {
    let mut s = Stave::from_slice(&[1, 2, 3, 4]).unwrap();
    let cursors: Vec<_> = (0..=4).map(|i| s.cursor(i).unwrap()).collect();
    s.push(5).unwrap();
    for c in &cursors {
        assert_eq!(s.cursor_state(c), CursorState::Invalidated);
        assert!(s.resolve(c).unwrap_err().is_cursor_error());
    }
}

#[test]
fn failed_insert_keeps_cursors_valid() {
    let mut s = roomy(4);
    let c = s.cursor(1).unwrap();
    let epoch = s.epoch();
    assert!(s
        .try_insert_with(0, || Err::<i32, _>("no value"))
        .is_err());
    assert_eq!(s.epoch(), epoch);
    assert_eq!(*s.resolve(&c).unwrap(), 1);
}

#[test]
fn cursors_from_another_container_are_foreign() {
    let a = roomy(3);
    let b = roomy(3);
    let err = b.resolve(&a.begin()).unwrap_err();
    assert!(matches!(err, StaveError::ForeignCursor { .. }));
    assert!(err.is_cursor_error());
}

#[test]
fn deep_history_tracks_many_tail_edits() {
    let mut s = roomy(40);
    let anchor = s.cursor(3).unwrap();
    for _ in 0..8 {
        s.pop().unwrap();
    }
    assert_eq!(*s.resolve(&anchor).unwrap(), 3);
    // The ninth edit pushes the anchor's mint past the history horizon.
    s.pop().unwrap();
    assert_eq!(s.cursor_state(&anchor), CursorState::Invalidated);
}

#[test]
fn panicking_predicate_still_stales_shifted_cursors() {
    let mut s = roomy(5);
    let c = s.cursor(2).unwrap();
    let result = catch_unwind(AssertUnwindSafe(|| {
        s.retain(|&v| {
            if v == 3 {
                panic!("predicate failed");
            }
            v != 1
        })
    }));
    assert!(result.is_err());
    assert_eq!(s, [0, 2, 3, 4]);
    assert_eq!(s.cursor_state(&c), CursorState::Invalidated);
    assert!(matches!(s.resolve(&c), Err(StaveError::StaleCursor { .. })));
}

#[test]
fn panicking_destructor_in_retain_stales_cursors() {
    let mut s = fused(5, 2);
    let c = s.cursor(3).unwrap();
    let result = catch_unwind(AssertUnwindSafe(|| s.retain(|f| f.tag != 2)));
    assert!(result.is_err());
    assert_eq!(tags(&s), [0, 1, 3, 4]);
    assert_eq!(s.cursor_state(&c), CursorState::Invalidated);
}

#[test]
fn panicking_destructor_in_erase_range_stales_cursors() {
    let mut s = fused(5, 1);
    let low = s.cursor(0).unwrap();
    let high = s.cursor(3).unwrap();
    let result = catch_unwind(AssertUnwindSafe(|| s.erase_range(1..2)));
    assert!(result.is_err());
    assert_eq!(tags(&s), [0, 2, 3, 4]);
    assert_eq!(s.cursor_state(&low), CursorState::Valid);
    assert_eq!(s.cursor_state(&high), CursorState::Invalidated);
}

#[test]
fn panicking_destructor_in_truncate_stales_cut_cursors() {
    let mut s = fused(5, 3);
    let kept = s.cursor(1).unwrap();
    let cut = s.cursor(2).unwrap();
    let result = catch_unwind(AssertUnwindSafe(|| s.truncate(2)));
    assert!(result.is_err());
    assert_eq!(tags(&s), [0, 1]);
    s.push(Fused { tag: 9, fuse: -1 }).unwrap();
    assert_eq!(s.cursor_state(&kept), CursorState::Valid);
    assert_eq!(s.cursor_state(&cut), CursorState::Invalidated);
}
