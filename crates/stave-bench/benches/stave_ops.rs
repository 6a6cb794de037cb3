//! Criterion micro-benchmarks for Stave insertion and erasure, with `Vec`
//! baselines for the same workloads.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use stave_bench::{apply_to_stave, apply_to_vec, edit_script};
use stave_seq::Stave;

const N: u64 = 10_000;

fn bench_push(c: &mut Criterion) {
    c.bench_function("stave_push_10k", |b| {
        b.iter(|| {
            let mut s = Stave::new();
            for v in 0..N {
                s.push(v).unwrap();
            }
            black_box(s.len());
        });
    });

    c.bench_function("vec_push_10k", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for x in 0..N {
                v.push(x);
            }
            black_box(v.len());
        });
    });
}

fn bench_front_insert(c: &mut Criterion) {
    c.bench_function("stave_front_insert_1k", |b| {
        b.iter(|| {
            let mut s = Stave::new();
            for v in 0..1_000u64 {
                s.insert(0, v).unwrap();
            }
            black_box(s.len());
        });
    });
}

fn bench_erase_middle(c: &mut Criterion) {
    let values: Vec<u64> = (0..N).collect();
    c.bench_function("stave_erase_middle_1k", |b| {
        b.iter_batched(
            || Stave::from_slice(&values).unwrap(),
            |mut s| {
                for _ in 0..1_000 {
                    let mid = s.len() / 2;
                    black_box(s.erase(mid).unwrap());
                }
                s
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("stave_erase_if_half", |b| {
        b.iter_batched(
            || Stave::from_slice(&values).unwrap(),
            |mut s| {
                black_box(s.erase_if(|v| v % 2 == 0));
                s
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_random_edits(c: &mut Criterion) {
    let script = edit_script(42, 5_000, 60);

    c.bench_function("stave_random_edits_5k", |b| {
        b.iter(|| {
            let mut s = Stave::new();
            apply_to_stave(&mut s, &script).unwrap();
            black_box(s.len());
        });
    });

    c.bench_function("vec_random_edits_5k", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            apply_to_vec(&mut v, &script);
            black_box(v.len());
        });
    });
}

fn bench_cursor_resolve(c: &mut Criterion) {
    let s = Stave::from_slice(&(0..N).collect::<Vec<_>>()).unwrap();
    let cursors: Vec<_> = (0..s.len()).step_by(7).map(|i| s.cursor(i).unwrap()).collect();
    c.bench_function("stave_cursor_resolve", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for cursor in &cursors {
                sum = sum.wrapping_add(*s.resolve(cursor).unwrap());
            }
            black_box(sum);
        });
    });
}

criterion_group!(
    benches,
    bench_push,
    bench_front_insert,
    bench_erase_middle,
    bench_random_edits,
    bench_cursor_resolve
);
criterion_main!(benches);
