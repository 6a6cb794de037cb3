//! Stave quickstart: build a container, edit it, and watch cursors and
//! metrics react.
//!
//! Run with:
//!   cargo run -p stave-seq --example quickstart

use stave_core::{CursorState, GrowthPolicy, StaveConfig, StaveError};
use stave_raw::Metered;
use stave_seq::Stave;

fn main() -> Result<(), StaveError> {
    // ─── Append and insert ──────────────────────────────────────

    let mut s: Stave<i32> = Stave::new();
    for v in 0..10 {
        s.push(v)?;
    }
    s.insert(5, 99)?;
    println!("after insert: {s:?} (capacity {})", s.capacity());

    // ─── Errors instead of panics ───────────────────────────────

    match s.insert(100, 1) {
        Err(e) => println!("rejected: {e}"),
        Ok(()) => unreachable!("index 100 is past the end"),
    }
    let failed = s.try_resize_with(20, |i| if i < 3 { Ok(i as i32) } else { Err("ran dry") });
    println!("fallible resize: {failed:?}; length still {}", s.len());

    // ─── Cursors ────────────────────────────────────────────────

    let low = s.cursor(2)?;
    let high = s.cursor(8)?;
    s.erase(6)?;
    println!(
        "after erase(6): cursor@2 {:?}, cursor@8 {:?}",
        s.cursor_state(&low),
        s.cursor_state(&high)
    );
    assert_eq!(s.cursor_state(&high), CursorState::Invalidated);

    // ─── Custom policy and a metered allocator ──────────────────

    let meter = Metered::new();
    let config = StaveConfig::new().with_growth(GrowthPolicy {
        numerator: 2,
        denominator: 1,
        min_capacity: 8,
    });
    let mut doubling = Stave::with_config_in(config, meter.clone())?;
    for v in 0..1000u64 {
        doubling.push(v)?;
    }
    println!("metrics: {:?}", doubling.metrics());
    println!("allocator: {:?}", meter.report());
    drop(doubling);
    println!("after drop: {} live blocks", meter.report().live_blocks());
    Ok(())
}
