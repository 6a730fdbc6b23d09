use core::{ops::Range, time::Duration};

/// What one worker did during a reduction.
///
/// Reports are sent by workers over a channel while they run and are only
/// read once every worker has been joined, so collecting them never touches
/// the hot path with a lock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockReport {
    /// Index of the partition the worker folded.
    pub partition: usize,
    /// The sequence indices the worker folded.
    pub range: Range<usize>,
    /// Wall-clock time the worker spent folding.
    pub elapsed: Duration,
    /// Name of the worker thread.
    pub thread: Option<String>,
}

/// The outcome of [`Reducer::reduce_detailed`](crate::Reducer::reduce_detailed).
#[derive(Clone, Debug, PartialEq)]
pub struct Reduction<T> {
    /// The final reduced value.
    pub value: T,
    /// Partial result of every partition, in partition order. Empty when the
    /// sequence was empty and no workers ran.
    pub partials: Vec<T>,
    /// Per-worker diagnostics in partition order. Empty unless diagnostics
    /// were enabled in the [`ReduceConfig`](crate::ReduceConfig).
    pub reports: Vec<BlockReport>,
}
