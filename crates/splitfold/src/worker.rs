//! Fork-join execution of partition folds.
//!
//! [`run_workers`] launches one scoped thread per [`Partition`]. Every worker
//! folds its own range starting from the operation's identity and writes the
//! result into a slot that only it can reach: the slots are allocated before
//! launch and each worker receives an exclusive `&mut` borrow of exactly one
//! of them. The sequence is shared read-only, so no lock is taken anywhere on
//! the hot path.
//!
//! All workers are joined before any slot is read. If a worker fails, the
//! remaining workers are still joined, then the first failure in partition
//! order is returned and every partial result is dropped.

use crate::{BlockReport, CancelToken, Error, FoldOp, Partition, ReduceConfig, Sequence};
use crossbeam_channel::Sender;
use crossbeam_utils::CachePadded;
use std::{any::Any, thread, time::Instant};

/// The partial results of a successful [`run_workers`] call.
#[derive(Debug)]
pub struct WorkerOutput<T> {
    /// One partial result per partition, in partition order.
    pub partials: Vec<T>,
    /// Per-worker diagnostics in partition order, if enabled.
    pub reports: Vec<BlockReport>,
}

/// A result slot written once by the worker that owns it.
///
/// Padded to a cache line so that workers finishing at the same time do not
/// bounce a shared line between cores.
struct Slot<T>(CachePadded<Option<T>>);

impl<T> Slot<T> {
    fn empty() -> Self {
        Self(CachePadded::new(None))
    }

    fn fill(&mut self, value: T) {
        debug_assert!(self.0.is_none(), "result slot written twice");
        *self.0 = Some(value);
    }

    fn into_inner(self) -> Option<T> {
        CachePadded::into_inner(self.0)
    }
}

/// Why a worker stopped early.
enum Failure<E> {
    Op(E),
    Cancelled,
}

/// Folds `partitions` of `sequence` concurrently, one thread per partition.
///
/// Each worker seeds its fold with [`FoldOp::identity`]. The caller's initial
/// value is not applied here; it is combined exactly once by
/// [`combine`](crate::combine).
///
/// Worker threads are named `splitfold-{index}`. Empty partitions are valid
/// and produce the identity value.
///
/// # Errors
///
/// - [`Error::Operation`] if the operation fails on an element.
/// - [`Error::WorkerPanicked`] if a worker panics.
/// - [`Error::Spawn`] if a worker thread cannot be created.
/// - [`Error::Cancelled`] if the configured [`CancelToken`] is cancelled
///   while workers are running.
///
/// In every case all started workers have been joined when this returns.
pub fn run_workers<S, O>(
    sequence: &S,
    partitions: &[Partition],
    op: &O,
    config: &ReduceConfig,
) -> crate::Result<WorkerOutput<S::Item>, O::Error>
where
    S: Sequence + ?Sized,
    S::Item: Send,
    O: FoldOp<S::Item>,
{
    run_workers_with(sequence, partitions, op, config, worker_thread)
}

fn worker_thread(partition: &Partition) -> thread::Builder {
    thread::Builder::new().name(format!("splitfold-{}", partition.index))
}

/// [`run_workers`] with a caller-supplied thread builder per partition.
fn run_workers_with<S, O, B>(
    sequence: &S,
    partitions: &[Partition],
    op: &O,
    config: &ReduceConfig,
    builder: B,
) -> crate::Result<WorkerOutput<S::Item>, O::Error>
where
    S: Sequence + ?Sized,
    S::Item: Send,
    O: FoldOp<S::Item>,
    B: Fn(&Partition) -> thread::Builder,
{
    let mut slots: Vec<Slot<S::Item>> = partitions.iter().map(|_| Slot::empty()).collect();
    let cancel = config.cancel_token();
    let (report_tx, report_rx) = crossbeam_channel::unbounded();
    let report_tx = config.diagnostics().then_some(report_tx);

    let work: Vec<_> = partitions.iter().zip(slots.iter_mut()).collect();

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(work.len());
        let mut spawn_error = None;

        for (partition, slot) in work {
            let reports = report_tx.clone();
            let spawned = builder(partition).spawn_scoped(scope, move || {
                worker(sequence, partition, op, cancel, slot, reports)
            });

            match spawned {
                Ok(handle) => handles.push((partition.index, handle)),
                Err(source) => {
                    spawn_error = Some(Error::Spawn {
                        partition: partition.index,
                        source,
                    });
                    break;
                }
            }
        }

        // Barrier: join every started worker, even after a failure.
        let mut failure = None;
        for (index, handle) in handles {
            let error = match handle.join() {
                Ok(Ok(())) => continue,
                Ok(Err(Failure::Op(error))) => Error::Operation {
                    partition: index,
                    error,
                },
                Ok(Err(Failure::Cancelled)) => Error::Cancelled,
                Err(payload) => Error::WorkerPanicked {
                    partition: index,
                    message: panic_message(payload.as_ref()),
                },
            };

            #[cfg(feature = "tracing")]
            tracing::debug!("Worker {index} failed");

            failure.get_or_insert(error);
        }

        // Spawning stops at the first refused partition, so any worker
        // failure belongs to an earlier partition.
        match failure.or(spawn_error) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    })?;

    let partials = slots
        .into_iter()
        .map(Slot::into_inner)
        .collect::<Option<Vec<_>>>()
        .expect("every joined worker fills its slot");

    let mut reports: Vec<_> = report_rx.try_iter().collect();
    reports.sort_by_key(|r| r.partition);

    #[cfg(feature = "tracing")]
    for r in &reports {
        tracing::debug!(
            "Partition {} [{}, {}) folded in {:?} on {}",
            r.partition,
            r.range.start,
            r.range.end,
            r.elapsed,
            r.thread.as_deref().unwrap_or("<unnamed>")
        );
    }

    Ok(WorkerOutput { partials, reports })
}

fn worker<S, O>(
    sequence: &S,
    partition: &Partition,
    op: &O,
    cancel: Option<&CancelToken>,
    slot: &mut Slot<S::Item>,
    reports: Option<Sender<BlockReport>>,
) -> Result<(), Failure<O::Error>>
where
    S: Sequence + ?Sized,
    O: FoldOp<S::Item>,
{
    let start = Instant::now();
    let value = fold_partition(sequence, partition, op, cancel)?;
    slot.fill(value);

    if let Some(tx) = reports {
        // The receiver outlives every worker, so this cannot fail.
        let _ = tx.send(BlockReport {
            partition: partition.index,
            range: partition.range.clone(),
            elapsed: start.elapsed(),
            thread: thread::current().name().map(str::to_owned),
        });
    }

    Ok(())
}

fn fold_partition<S, O>(
    sequence: &S,
    partition: &Partition,
    op: &O,
    cancel: Option<&CancelToken>,
) -> Result<S::Item, Failure<O::Error>>
where
    S: Sequence + ?Sized,
    O: FoldOp<S::Item>,
{
    let range = partition.range.clone();
    match cancel {
        None => sequence.try_fold_range(range, op.identity(), |acc, item| {
            op.combine(acc, item).map_err(Failure::Op)
        }),
        Some(token) => sequence.try_fold_range(range, op.identity(), |acc, item| {
            if token.is_cancelled() {
                return Err(Failure::Cancelled);
            }
            op.combine(acc, item).map_err(Failure::Op)
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("<non-string panic payload>")
    }
}
