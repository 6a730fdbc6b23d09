use core::convert::Infallible;

/// A result type that is infallible by default.
///
/// Reductions driven by the built-in operations cannot fail at the operation
/// level, so the error parameter defaults to [`Infallible`]. Fallible
/// operations surface their own error type through [`Error::Operation`].
pub type Result<T, E = Infallible> = core::result::Result<T, Error<E>>;

/// All errors a reduction can produce.
///
/// A reduction fails atomically: whenever one of these is returned, every
/// worker has already been joined and all partial results were discarded.
///
/// The generic parameter `E` is the error type of the combining operation
/// (see [`FoldOp::Error`](crate::FoldOp::Error)). It is [`Infallible`] for the
/// built-in operations, in which case [`Error::Operation`] can never be
/// constructed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error<E = Infallible> {
    /// The combining operation returned an error.
    ///
    /// `partition` is the index of the partition being folded when the
    /// operation failed. Failures during the final combination report the
    /// index of the partial result being combined.
    #[error("operation failed in partition {partition}: {error:?}")]
    Operation {
        /// Index of the failing partition.
        partition: usize,
        /// Error returned by the operation.
        error: E,
    },

    /// A worker panicked while folding its partition.
    #[error("worker for partition {partition} panicked: {message}")]
    WorkerPanicked {
        /// Index of the partition owned by the worker.
        partition: usize,
        /// The panic payload, if it was a string.
        message: String,
    },

    /// The operating system refused to spawn a worker thread.
    ///
    /// Workers spawned before the failure are still joined before this is
    /// returned.
    #[error("failed to spawn worker for partition {partition}")]
    Spawn {
        /// Index of the partition that could not be started.
        partition: usize,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The reduction observed a cancelled [`CancelToken`](crate::CancelToken).
    #[error("reduction cancelled")]
    Cancelled,
}

impl<E> Error<E> {
    /// Returns the partition index associated with this error, if any.
    pub fn partition(&self) -> Option<usize> {
        match self {
            Self::Operation { partition, .. }
            | Self::WorkerPanicked { partition, .. }
            | Self::Spawn { partition, .. } => Some(*partition),
            Self::Cancelled => None,
        }
    }

    /// Returns `true` if the reduction stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
