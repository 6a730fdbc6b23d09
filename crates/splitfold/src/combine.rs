use crate::{Error, FoldOp, Result};

/// Folds `partials` into `init`, strictly left to right.
///
/// Partial results must be supplied in ascending partition order. Walking
/// them in that order keeps the outcome reproducible for operations that are
/// not commutative or that round, such as floating-point addition, no matter
/// in which order the workers finished.
///
/// # Errors
///
/// Returns [`Error::Operation`] with the index of the partial result being
/// combined if the operation fails.
///
/// ```
/// use splitfold::{Sum, combine};
///
/// assert_eq!(combine(100, [1, 2, 12], &Sum).unwrap(), 115);
/// ```
pub fn combine<T, O>(
    init: T,
    partials: impl IntoIterator<Item = T>,
    op: &O,
) -> Result<T, O::Error>
where
    O: FoldOp<T>,
{
    partials
        .into_iter()
        .enumerate()
        .try_fold(init, |acc, (partition, partial)| {
            op.combine(acc, partial)
                .map_err(|error| Error::Operation { partition, error })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{op_fn, try_op_fn};

    #[test]
    fn init_is_applied_once_at_the_front() {
        let concat = op_fn(String::new(), |a, b| a + &b);
        let out = combine(
            "init:".to_string(),
            ["a".to_string(), "b".to_string(), "c".to_string()],
            &concat,
        )
        .unwrap();
        assert_eq!(out, "init:abc");
    }

    #[test]
    fn no_partials_returns_init() {
        assert_eq!(combine(42, Vec::new(), &crate::Sum).unwrap(), 42);
    }

    #[test]
    fn reports_failing_partial() {
        let checked = try_op_fn(0u8, |a: u8, b| a.checked_add(b).ok_or("overflow"));
        let err = combine(200u8, [10, 50, 1], &checked).unwrap_err();
        assert_eq!(err.partition(), Some(1));
    }
}
