//! Every element a container constructs is destroyed exactly once, and
//! every block it allocates is returned.

use stave_raw::Metered;
use stave_seq::Stave;
use stave_test_utils::{Ledger, Tracked, TrackedSource};

#[test]
fn mixed_workload_balances() {
    let ledger = Ledger::new();
    let meter = Metered::new();
    {
        let mut s: Stave<Tracked, _> = Stave::new_in(meter.clone());
        for v in 0..50 {
            s.push(ledger.make(v)).unwrap();
        }
        s.insert_hole(10, 7, &mut TrackedSource::new(&ledger, 1000)).unwrap();
        s.erase_range(3..20).unwrap();
        s.retain(|t| t.value % 3 != 0);
        let seed = ledger.make(-1);
        s.insert_n(0, 4, &seed).unwrap();
        s.truncate(20);
        s.shrink_to_fit().unwrap();
        s.extend_from_within(..5).unwrap();
        drop(s.erase(2).unwrap());
        assert_eq!(ledger.live_count(), s.len() + 1);
    }
    assert_eq!(ledger.live_count(), 0);
    assert_eq!(ledger.balance(), 0);
    assert_eq!(ledger.double_drops(), 0);
    let report = meter.report();
    assert_eq!(report.live_blocks(), 0);
    assert_eq!(report.live_bytes, 0);
}

#[test]
fn partially_consumed_into_iter_drops_the_rest() {
    let ledger = Ledger::new();
    let meter = Metered::new();
    let mut s = Stave::new_in(meter.clone());
    for v in 0..8 {
        s.push(ledger.make(v)).unwrap();
    }
    let mut it = s.into_iter();
    let first = it.next().unwrap();
    let last = it.next_back().unwrap();
    assert_eq!((first.value, last.value), (0, 7));
    drop(it);
    assert_eq!(ledger.live_count(), 2);
    assert_eq!(meter.report().live_blocks(), 0);
    drop((first, last));
    assert_eq!(ledger.balance(), 0);
}

#[test]
fn append_moves_without_cloning() {
    let ledger = Ledger::new();
    let mut a = Stave::from_slice(&ledger.make_all(0..3)).unwrap();
    let mut b = Stave::from_slice(&ledger.make_all(3..6)).unwrap();
    let clones = ledger.clones();
    a.append(&mut b).unwrap();
    assert_eq!(ledger.clones(), clones);
    assert!(b.is_empty());
    assert_eq!(a.iter().map(|t| t.value).collect::<Vec<_>>(), [0, 1, 2, 3, 4, 5]);
}

#[test]
fn assign_and_swap_keep_balance() {
    let ledger = Ledger::new();
    let mut a = Stave::from_slice(&ledger.make_all(0..4)).unwrap();
    let mut b = Stave::from_slice(&ledger.make_all(10..12)).unwrap();
    a.swap_with(&mut b);
    assert_eq!(a.len(), 2);
    let replacement = ledger.make_all(20..25);
    a.assign_from_slice(&replacement).unwrap();
    drop(replacement);
    assert_eq!(ledger.live_count(), a.len() + b.len());
    drop(a);
    drop(b);
    assert_eq!(ledger.live_count(), 0);
    assert_eq!(ledger.double_drops(), 0);
}

#[test]
fn zero_sized_elements_never_allocate() {
    let meter = Metered::new();
    let mut s: Stave<(), _> = Stave::new_in(meter.clone());
    for _ in 0..1000 {
        s.push(()).unwrap();
    }
    s.insert(500, ()).unwrap();
    assert_eq!(s.len(), 1001);
    s.erase_range(..).unwrap();
    assert!(s.is_empty());
    assert_eq!(meter.report().allocations, 0);
}
