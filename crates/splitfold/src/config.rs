use crate::CancelToken;
use core::num::NonZeroUsize;
use std::{env, ffi::OsStr};

/// Worker count used when the platform cannot report its concurrency.
pub const FALLBACK_WORKERS: NonZeroUsize = NonZeroUsize::new(2).unwrap();

/// Environment variable read by [`WorkerCount::from_env`].
pub const WORKERS_ENV: &str = "SPLITFOLD_WORKERS";

/// Returns the platform's concurrency hint, falling back to
/// [`FALLBACK_WORKERS`] if the platform reports zero.
pub fn available_workers() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(FALLBACK_WORKERS)
}

/// How many workers (and therefore partitions) a reduction uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WorkerCount {
    /// One worker per logical CPU, as reported by the platform.
    #[default]
    Available,
    /// A fixed number of workers, regardless of the hardware.
    Fixed(NonZeroUsize),
}

impl WorkerCount {
    /// A fixed worker count. Zero is corrected to [`FALLBACK_WORKERS`].
    pub fn fixed(workers: usize) -> Self {
        Self::Fixed(NonZeroUsize::new(workers).unwrap_or(FALLBACK_WORKERS))
    }

    /// Reads the worker count from the `SPLITFOLD_WORKERS` environment
    /// variable.
    ///
    /// Missing, unparsable, or zero values fall back to
    /// [`WorkerCount::Available`].
    pub fn from_env() -> Self {
        Self::parse(env::var_os(WORKERS_ENV).as_deref())
    }

    fn parse(value: Option<&OsStr>) -> Self {
        value
            .and_then(|v| v.to_str())
            .and_then(|v| v.trim().parse::<usize>().ok())
            .and_then(NonZeroUsize::new)
            .map_or(Self::Available, Self::Fixed)
    }

    /// Resolves to a concrete, non-zero number of workers.
    pub fn resolve(self) -> NonZeroUsize {
        match self {
            Self::Available => available_workers(),
            Self::Fixed(n) => n,
        }
    }
}

impl From<usize> for WorkerCount {
    fn from(workers: usize) -> Self {
        Self::fixed(workers)
    }
}

/// Options controlling a [`Reducer`](crate::Reducer).
///
/// ```
/// use splitfold::{CancelToken, ReduceConfig, WorkerCount};
///
/// let config = ReduceConfig::new()
///     .with_workers(WorkerCount::fixed(4))
///     .with_diagnostics(true)
///     .with_cancel_token(CancelToken::new());
/// assert_eq!(config.workers().resolve().get(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReduceConfig {
    workers: WorkerCount,
    diagnostics: bool,
    cancel: Option<CancelToken>,
}

impl ReduceConfig {
    /// Default configuration: one worker per logical CPU, no diagnostics, no
    /// cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: impl Into<WorkerCount>) -> Self {
        self.workers = workers.into();
        self
    }

    /// Collects a [`BlockReport`](crate::BlockReport) from every worker.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// Lets the caller stop a running reduction through `token`.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn workers(&self) -> WorkerCount {
        self.workers
    }

    pub fn diagnostics(&self) -> bool {
        self.diagnostics
    }

    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }
}
