use crate::{
    CancelToken, Error, FoldOp, Max, Min, Product, ReduceConfig, Reducer, Sequence, Sum,
    WorkerCount, available_workers, op_fn, parallel_reduce, partition, try_op_fn,
    try_parallel_reduce,
};
use core::convert::Infallible;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

fn sequential<S, O>(seq: &S, init: S::Item, op: &O) -> S::Item
where
    S: Sequence + ?Sized,
    O: FoldOp<S::Item, Error = Infallible>,
{
    match seq.try_fold_range(0..seq.len(), init, |acc, x| op.combine(acc, x)) {
        Ok(v) => v,
        Err(never) => match never {},
    }
}

#[test]
fn empty_input_returns_init() {
    let empty: Vec<i32> = Vec::new();
    for workers in 1..=8 {
        let reducer = Reducer::with_workers(workers);
        assert_eq!(reducer.reduce(&empty, 17, Sum), 17);
        assert_eq!(reducer.reduce(&empty, -3, Product), -3);
    }
    assert_eq!(parallel_reduce(&empty, 5, Sum), 5);
    assert_eq!(parallel_reduce(&(4u64..4), 9, Sum), 9);
}

#[test]
fn empty_input_reports_no_workers() {
    let reducer = Reducer::new(ReduceConfig::new().with_diagnostics(true));
    let out = reducer.reduce_detailed(&[0u8; 0], 1, Sum).unwrap();
    assert_eq!(out.value, 1);
    assert!(out.partials.is_empty());
    assert!(out.reports.is_empty());
}

#[test]
fn matches_sequential_fold_for_integer_addition() {
    for len in 0..=100 {
        let seq: Vec<i64> = (0..len).map(|i| i * 7 - 150).collect();
        let expected = sequential(&seq, 42, &Sum);
        for workers in 1..=8 {
            let got = Reducer::with_workers(workers).reduce(&seq, 42, Sum);
            assert_eq!(got, expected, "len={len} workers={workers}");
        }
    }
}

#[test]
fn matches_sequential_fold_for_min_max_product() {
    let seq: Vec<u32> = (1..=40).map(|i| (i * 37) % 101).collect();
    for workers in 1..=8 {
        let reducer = Reducer::with_workers(workers);
        assert_eq!(reducer.reduce(&seq, u32::MAX, Min), 3);
        assert_eq!(reducer.reduce(&seq, 0, Max), 100);
        assert_eq!(
            reducer.reduce(&seq, 1, Product),
            sequential(&seq, 1, &Product)
        );
    }
}

#[test]
fn more_workers_than_elements() {
    let seq = [3, 4, 5];
    for workers in [4, 5, 16, 64] {
        assert_eq!(Reducer::with_workers(workers).reduce(&seq, 0, Sum), 12);
    }
}

#[test]
fn deterministic_for_fixed_worker_count() {
    let seq: Vec<f64> = (0..10_000).map(|i| (i as f64).sin() * 1e-3 + 0.1).collect();
    let reducer = Reducer::with_workers(6);

    let first = reducer.reduce(&seq, 0.5, Sum);
    for _ in 0..10 {
        assert_eq!(reducer.reduce(&seq, 0.5, Sum).to_bits(), first.to_bits());
    }

    // Same grouping, computed by hand: per-partition sums folded in order.
    let expected = partition(seq.len(), WorkerCount::fixed(6).resolve())
        .iter()
        .map(|p| seq[p.range.clone()].iter().fold(0.0, |acc, x| acc + x))
        .fold(0.5, |acc, partial| acc + partial);
    assert_eq!(first.to_bits(), expected.to_bits());
}

#[test]
fn million_twos_sum_to_two_million() {
    let seq = vec![2i64; 1_000_000];
    for workers in 1..=available_workers().get() {
        assert_eq!(Reducer::with_workers(workers).reduce(&seq, 0, Sum), 2_000_000);
    }
    assert_eq!(parallel_reduce(&seq, 0, Sum), 2_000_000);
}

#[test]
fn five_elements_three_workers() {
    let reducer = Reducer::new(
        ReduceConfig::new()
            .with_workers(WorkerCount::fixed(3))
            .with_diagnostics(true),
    );
    let out = reducer.reduce_detailed(&[1, 2, 3, 4, 5], 100, Sum).unwrap();

    // Block size is 5 / 3 = 1, so the last partition takes the remainder.
    assert_eq!(out.partials, [1, 2, 12]);
    assert_eq!(out.value, 115);
    let ranges: Vec<_> = out.reports.iter().map(|r| r.range.clone()).collect();
    assert_eq!(ranges, [0..1, 1..2, 2..5]);
}

#[test]
fn other_sequence_kinds() {
    let deque: VecDeque<u32> = (1..=10).collect();
    assert_eq!(Reducer::with_workers(3).reduce(&deque, 0, Sum), 55);

    let range = 1u64..1_001;
    assert_eq!(Reducer::with_workers(7).reduce(&range, 0, Sum), 500_500);

    let slice: &[u8] = &[1, 2, 3];
    assert_eq!(Reducer::with_workers(2).reduce(slice, 0, Max), 3);
}

#[test]
fn partition_order_is_preserved_for_non_commutative_ops() {
    let words: Vec<String> = "the quick brown fox jumps over the lazy dog"
        .split(' ')
        .map(str::to_owned)
        .collect();
    let concat = op_fn(String::new(), |a: String, b: String| a + &b);
    for workers in 1..=12 {
        let out = Reducer::with_workers(workers).reduce(&words, ">".to_string(), &concat);
        assert_eq!(out, ">thequickbrownfoxjumpsoverthelazydog");
    }
}

#[test]
fn operation_failure_joins_every_worker() {
    let calls = AtomicUsize::new(0);
    let fails_on_ten = try_op_fn(0u64, |a: u64, b: u64| {
        calls.fetch_add(1, Ordering::SeqCst);
        if b == 10 {
            Err("ten")
        } else {
            Ok(a + b)
        }
    });

    let err = Reducer::with_workers(4)
        .try_reduce(&(0u64..1_000), 0, &fails_on_ten)
        .unwrap_err();

    match err {
        Error::Operation { partition, error } => {
            assert_eq!(partition, 0);
            assert_eq!(error, "ten");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Partition 0 stopped after 11 calls, the other three ran to completion.
    // Every worker has been joined, so the count can no longer change.
    assert_eq!(calls.load(Ordering::SeqCst), 11 + 3 * 250);
}

#[test]
fn panicking_worker_is_reported_after_join() {
    let finished = AtomicUsize::new(0);
    let op = try_op_fn(0u32, |a: u32, b: u32| {
        if b == 500 {
            panic!("bad element {b}");
        }
        if b % 250 == 249 {
            finished.fetch_add(1, Ordering::SeqCst);
        }
        Ok::<_, Infallible>(a + b)
    });

    let err = Reducer::with_workers(4)
        .try_reduce(&(0u32..1_000), 0, &op)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::WorkerPanicked { partition: 2, ref message } if message == "bad element 500"
    ));
    // Partitions 0, 1 and 3 each reached their last element.
    assert_eq!(finished.load(Ordering::SeqCst), 3);
}

#[test]
#[should_panic(expected = "worker for partition 1 panicked: boom")]
fn reduce_repanics_on_caller_thread() {
    let op = op_fn(0i32, |a: i32, b: i32| {
        if b == 4 {
            panic!("boom");
        }
        a + b
    });
    Reducer::with_workers(2).reduce(&[1, 2, 3, 4], 0, op);
}

#[test]
fn fallible_ops_succeed_when_nothing_fails() {
    let checked = try_op_fn(0u32, |a: u32, b| a.checked_add(b).ok_or(()));
    let seq: Vec<u32> = (0..1_000).collect();
    assert_eq!(try_parallel_reduce(&seq, 5, &checked).unwrap(), 499_505);
}

#[test]
fn cancelled_before_start() {
    let token = CancelToken::new();
    token.cancel();
    let reducer = Reducer::new(
        ReduceConfig::new()
            .with_workers(WorkerCount::fixed(4))
            .with_cancel_token(token),
    );

    let err = reducer.try_reduce(&vec![1u8; 64], 0, Sum).unwrap_err();
    assert!(err.is_cancelled());

    // An empty sequence never starts a worker, so it still returns `init`.
    assert_eq!(reducer.try_reduce(&Vec::<u8>::new(), 3, Sum).unwrap(), 3);
}

#[test]
fn cancelled_while_running() {
    let token = CancelToken::new();
    let seen = AtomicUsize::new(0);
    let op = op_fn(0u64, {
        let token = token.clone();
        let seen = &seen;
        move |a: u64, b: u64| {
            seen.fetch_add(1, Ordering::SeqCst);
            if b == 5 {
                token.cancel();
            }
            a + b
        }
    });

    let reducer = Reducer::new(
        ReduceConfig::new()
            .with_workers(WorkerCount::fixed(1))
            .with_cancel_token(token),
    );
    let err = reducer.try_reduce(&(0u64..100), 0, &op).unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(seen.load(Ordering::SeqCst), 6);
}
