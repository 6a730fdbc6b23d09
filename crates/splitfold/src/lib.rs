//! Fork-join parallel reduction.
//!
//! `splitfold` computes the same value as a sequential left fold over a
//! length-known sequence, but splits the work across several threads:
//!
//! 1. [`partition`] cuts `[0, len)` into one contiguous block per worker, the
//!    last block absorbing the remainder.
//! 2. [`run_workers`] folds every block on its own scoped thread, starting
//!    from the operation's identity, and joins them all.
//! 3. [`combine`] folds the caller's initial value with the partial results in
//!    partition order.
//!
//! ```
//! use splitfold::{Reducer, Sum, parallel_reduce};
//!
//! let v = vec![2i64; 1_000_000];
//! assert_eq!(parallel_reduce(&v, 0, Sum), 2_000_000);
//!
//! // Force a worker count, e.g. for reproducible floating-point results.
//! let reducer = Reducer::with_workers(3);
//! assert_eq!(reducer.reduce(&[1, 2, 3, 4, 5], 100, Sum), 115);
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events for partitioning, worker failures and,
//!   when diagnostics are enabled, one event per worker after the join.

mod cancel;
mod combine;
mod config;
mod error;
mod op;
mod partition;
mod reduce;
mod report;
mod sequence;
mod worker;

#[cfg(test)]
mod tests;

pub use crate::cancel::*;
pub use crate::combine::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::op::*;
pub use crate::partition::*;
pub use crate::reduce::*;
pub use crate::report::*;
pub use crate::sequence::*;
pub use crate::worker::*;
