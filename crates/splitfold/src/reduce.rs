use crate::{
    Error, FoldOp, ReduceConfig, Reduction, Result, Sequence, WorkerCount, WorkerOutput,
    combine, partition, run_workers,
};
use core::convert::Infallible;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Runs parallel reductions with a fixed [`ReduceConfig`].
///
/// A reduction partitions the sequence into one contiguous block per worker,
/// folds every block on its own thread starting from the operation's
/// identity, waits for all workers, and then combines `init` with the partial
/// results in partition order.
///
/// For associative and commutative operations on integers the result is
/// identical to a sequential fold. Otherwise only partition order is
/// preserved: with a fixed worker count the result is deterministic, but it
/// may differ from the sequential fold (for example by floating-point
/// rounding). Operations that are not associative should not be reduced in
/// parallel.
///
/// # Example
///
/// ```
/// use splitfold::{Reducer, ReduceConfig, Sum, WorkerCount};
///
/// let reducer = Reducer::new(ReduceConfig::new().with_workers(WorkerCount::fixed(3)));
/// assert_eq!(reducer.reduce(&[1, 2, 3, 4, 5], 100, Sum), 115);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Reducer {
    config: ReduceConfig,
}

impl Reducer {
    pub fn new(config: ReduceConfig) -> Self {
        Self { config }
    }

    /// A reducer using exactly `workers` workers (zero is corrected to
    /// [`FALLBACK_WORKERS`](crate::FALLBACK_WORKERS)).
    pub fn with_workers(workers: usize) -> Self {
        Self::new(ReduceConfig::new().with_workers(WorkerCount::fixed(workers)))
    }

    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Reduces `sequence` into `init` with `op`.
    ///
    /// An empty sequence returns `init` without starting any worker.
    ///
    /// # Errors
    ///
    /// See [`run_workers`] for the failures a reduction can report. A failure
    /// is reported only after every worker has been joined, and no partial
    /// result is ever returned alongside it.
    pub fn try_reduce<S, O>(
        &self,
        sequence: &S,
        init: S::Item,
        op: O,
    ) -> Result<S::Item, O::Error>
    where
        S: Sequence + ?Sized,
        S::Item: Send,
        O: FoldOp<S::Item>,
    {
        match self.execute(sequence, &op)? {
            Some(output) => combine(init, output.partials, &op),
            None => Ok(init),
        }
    }

    /// Like [`try_reduce`](Self::try_reduce) for operations that cannot fail.
    ///
    /// # Panics
    ///
    /// Panics if a worker panicked (after all workers were joined), if a
    /// worker thread could not be spawned, or if the configured
    /// [`CancelToken`](crate::CancelToken) was cancelled.
    pub fn reduce<S, O>(&self, sequence: &S, init: S::Item, op: O) -> S::Item
    where
        S: Sequence + ?Sized,
        S::Item: Send,
        O: FoldOp<S::Item, Error = Infallible>,
    {
        match self.try_reduce(sequence, init, op) {
            Ok(value) => value,
            Err(Error::Operation { error, .. }) => match error {},
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`try_reduce`](Self::try_reduce), but also returns every partial
    /// result and, if enabled, the per-worker [`BlockReport`]s.
    ///
    /// [`BlockReport`]: crate::BlockReport
    pub fn reduce_detailed<S, O>(
        &self,
        sequence: &S,
        init: S::Item,
        op: O,
    ) -> Result<Reduction<S::Item>, O::Error>
    where
        S: Sequence + ?Sized,
        S::Item: Send + Clone,
        O: FoldOp<S::Item>,
    {
        let Some(WorkerOutput { partials, reports }) = self.execute(sequence, &op)? else {
            return Ok(Reduction {
                value: init,
                partials: Vec::new(),
                reports: Vec::new(),
            });
        };

        let value = combine(init, partials.iter().cloned(), &op)?;
        Ok(Reduction {
            value,
            partials,
            reports,
        })
    }

    /// Partitions the sequence and runs the workers. Returns `None` for an
    /// empty sequence.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    fn execute<S, O>(
        &self,
        sequence: &S,
        op: &O,
    ) -> Result<Option<WorkerOutput<S::Item>>, O::Error>
    where
        S: Sequence + ?Sized,
        S::Item: Send,
        O: FoldOp<S::Item>,
    {
        let len = sequence.len();
        if len == 0 {
            #[cfg(feature = "tracing")]
            tracing::trace!("Empty sequence, no workers started");
            return Ok(None);
        }

        let workers = self.config.workers().resolve();
        let partitions = partition(len, workers);

        #[cfg(feature = "tracing")]
        tracing::debug!("Folding {len} elements on {workers} workers");

        run_workers(sequence, &partitions, op, &self.config).map(Some)
    }
}

/// Reduces `sequence` into `init` with `op`, using one worker per logical
/// CPU.
///
/// See [`Reducer`] for the guarantees and [`Reducer::reduce`] for the panic
/// conditions.
///
/// ```
/// use splitfold::{Sum, parallel_reduce};
///
/// let v = vec![2u64; 1_000];
/// assert_eq!(parallel_reduce(&v, 0, Sum), 2_000);
/// assert_eq!(parallel_reduce(&Vec::<u64>::new(), 7, Sum), 7);
/// ```
pub fn parallel_reduce<S, O>(sequence: &S, init: S::Item, op: O) -> S::Item
where
    S: Sequence + ?Sized,
    S::Item: Send,
    O: FoldOp<S::Item, Error = Infallible>,
{
    Reducer::default().reduce(sequence, init, op)
}

/// Fallible counterpart of [`parallel_reduce`].
///
/// # Errors
///
/// See [`Reducer::try_reduce`].
pub fn try_parallel_reduce<S, O>(
    sequence: &S,
    init: S::Item,
    op: O,
) -> Result<S::Item, O::Error>
where
    S: Sequence + ?Sized,
    S::Item: Send,
    O: FoldOp<S::Item>,
{
    Reducer::default().try_reduce(sequence, init, op)
}
