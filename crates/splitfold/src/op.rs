use core::{convert::Infallible, marker::PhantomData};

/// A binary combining operation with an identity value.
///
/// Each worker seeds its local fold with [`identity`](FoldOp::identity), and
/// the same [`combine`](FoldOp::combine) function merges elements into a
/// partial result and partial results into the final value. For the parallel
/// result to match a sequential fold the operation must be associative and
/// `identity` must satisfy `combine(x, identity()) == x`.
///
/// Operations that cannot fail use [`Infallible`] as their error type. Only
/// those can be used with the panicking entry points such as
/// [`parallel_reduce`](crate::parallel_reduce).
pub trait FoldOp<T>: Sync {
    /// Error returned when combining fails.
    type Error: Send;

    /// Returns the identity value used to seed each partition's fold.
    fn identity(&self) -> T;

    /// Combines the running value with the next element or partial result.
    fn combine(&self, acc: T, item: T) -> Result<T, Self::Error>;
}

impl<T, O: FoldOp<T> + ?Sized> FoldOp<T> for &O {
    type Error = O::Error;

    fn identity(&self) -> T {
        (**self).identity()
    }

    fn combine(&self, acc: T, item: T) -> Result<T, Self::Error> {
        (**self).combine(acc, item)
    }
}

/// Addition. Integer addition wraps so that any grouping of the fold yields
/// the same result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sum;

/// Multiplication. Integer multiplication wraps, like [`Sum`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Product;

/// Minimum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Min;

/// Maximum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Max;

macro_rules! impl_int_ops {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FoldOp<$ty> for Sum {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    0
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc.wrapping_add(item))
                }
            }

            impl FoldOp<$ty> for Product {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    1
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc.wrapping_mul(item))
                }
            }

            impl FoldOp<$ty> for Min {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    <$ty>::MAX
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc.min(item))
                }
            }

            impl FoldOp<$ty> for Max {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    <$ty>::MIN
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc.max(item))
                }
            }
        )*
    };
}

macro_rules! impl_float_ops {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FoldOp<$ty> for Sum {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    0.0
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc + item)
                }
            }

            impl FoldOp<$ty> for Product {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    1.0
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc * item)
                }
            }

            impl FoldOp<$ty> for Min {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    <$ty>::INFINITY
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc.min(item))
                }
            }

            impl FoldOp<$ty> for Max {
                type Error = Infallible;
                #[inline]
                fn identity(&self) -> $ty {
                    <$ty>::NEG_INFINITY
                }
                #[inline]
                fn combine(&self, acc: $ty, item: $ty) -> Result<$ty, Infallible> {
                    Ok(acc.max(item))
                }
            }
        )*
    };
}

impl_int_ops!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float_ops!(f32, f64);

/// An infallible operation built from a closure and its identity value.
///
/// Created by [`op_fn`].
#[derive(Clone, Debug)]
pub struct FnOp<T, F> {
    identity: T,
    f: F,
}

/// Builds an infallible [`FoldOp`] from an identity value and a closure.
///
/// ```
/// use splitfold::{op_fn, parallel_reduce};
///
/// let xor = op_fn(0u32, |a, b| a ^ b);
/// assert_eq!(parallel_reduce(&[1u32, 2, 4, 8], 0, xor), 15);
/// ```
pub fn op_fn<T, F>(identity: T, f: F) -> FnOp<T, F>
where
    T: Clone + Sync,
    F: Fn(T, T) -> T + Sync,
{
    FnOp { identity, f }
}

impl<T, F> FoldOp<T> for FnOp<T, F>
where
    T: Clone + Sync,
    F: Fn(T, T) -> T + Sync,
{
    type Error = Infallible;

    fn identity(&self) -> T {
        self.identity.clone()
    }

    fn combine(&self, acc: T, item: T) -> Result<T, Infallible> {
        Ok((self.f)(acc, item))
    }
}

/// A fallible operation built from a closure and its identity value.
///
/// Created by [`try_op_fn`].
pub struct TryFnOp<T, E, F> {
    identity: T,
    f: F,
    _error: PhantomData<fn() -> E>,
}

/// Builds a fallible [`FoldOp`] from an identity value and a closure
/// returning [`Result`].
///
/// ```
/// use splitfold::{try_op_fn, try_parallel_reduce};
///
/// let checked = try_op_fn(0u8, |a: u8, b| a.checked_add(b).ok_or("overflow"));
/// assert_eq!(try_parallel_reduce(&[1u8, 2, 3], 0, &checked).unwrap(), 6);
/// assert!(try_parallel_reduce(&[200u8, 100], 0, &checked).is_err());
/// ```
pub fn try_op_fn<T, E, F>(identity: T, f: F) -> TryFnOp<T, E, F>
where
    T: Clone + Sync,
    E: Send,
    F: Fn(T, T) -> Result<T, E> + Sync,
{
    TryFnOp {
        identity,
        f,
        _error: PhantomData,
    }
}

impl<T, E, F> FoldOp<T> for TryFnOp<T, E, F>
where
    T: Clone + Sync,
    E: Send,
    F: Fn(T, T) -> Result<T, E> + Sync,
{
    type Error = E;

    fn identity(&self) -> T {
        self.identity.clone()
    }

    fn combine(&self, acc: T, item: T) -> Result<T, E> {
        (self.f)(acc, item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold<T, O: FoldOp<T, Error = Infallible>>(op: &O, items: impl IntoIterator<Item = T>) -> T {
        items
            .into_iter()
            .fold(op.identity(), |acc, x| match op.combine(acc, x) {
                Ok(v) => v,
                Err(never) => match never {},
            })
    }

    #[test]
    fn identities_are_neutral() {
        assert_eq!(fold(&Sum, [3i32, 4]), 7);
        assert_eq!(fold(&Product, [3u64, 4]), 12);
        assert_eq!(fold(&Min, [3i8, -4]), -4);
        assert_eq!(fold(&Max, [3u16, 4]), 4);
        assert_eq!(fold(&Sum, [0.5f64, 0.25]), 0.75);
        assert_eq!(fold(&Min, [2.0f32, 1.0]), 1.0);
        assert_eq!(fold(&Max, Vec::<f64>::new()), f64::NEG_INFINITY);
    }

    #[test]
    fn integer_sum_wraps() {
        assert_eq!(fold(&Sum, [u8::MAX, 2]), 1);
        assert_eq!(fold(&Product, [128u8, 2]), 0);
    }

    #[test]
    fn closure_ops() {
        let concat = op_fn(String::new(), |a, b| a + &b);
        assert_eq!(fold(&concat, ["ab".to_string(), "cd".to_string()]), "abcd");

        let checked = try_op_fn(0u8, |a: u8, b| a.checked_add(b).ok_or(()));
        assert_eq!(checked.combine(250, 5), Ok(255));
        assert_eq!(checked.combine(250, 6), Err(()));
    }

    #[test]
    fn references_forward() {
        let op = &Sum;
        assert_eq!(FoldOp::<i32>::identity(&op), 0);
        assert_eq!(FoldOp::<i32>::combine(&op, 1, 2), Ok(3));
    }
}
