use core::ops::Range;
use std::collections::VecDeque;

/// A finite, position-addressable sequence that can be folded in parallel.
///
/// Implementors expose their length in O(1) and can fold any sub-range of
/// indices. The reduction only borrows the sequence and reads disjoint ranges
/// from several threads at once, hence the [`Sync`] bound.
///
/// Implementations are provided for slices, arrays, [`Vec`], [`VecDeque`],
/// and integer ranges (an arithmetic sequence with no backing storage).
/// `Range<u64>` is only a sequence on 64-bit targets, so its length always
/// fits in a `usize`.
pub trait Sequence: Sync {
    /// The element type, which is also the type the reduction produces.
    type Item;

    /// Number of elements in the sequence.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Folds the elements at positions `range` into `init`, stopping at the
    /// first error returned by `f`.
    ///
    /// `range` always lies within `0..self.len()`.
    fn try_fold_range<B, E, F>(&self, range: Range<usize>, init: B, f: F) -> Result<B, E>
    where
        F: FnMut(B, Self::Item) -> Result<B, E>;
}

impl<T: Clone + Sync> Sequence for [T] {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn try_fold_range<B, E, F>(&self, range: Range<usize>, init: B, f: F) -> Result<B, E>
    where
        F: FnMut(B, T) -> Result<B, E>,
    {
        self[range].iter().cloned().try_fold(init, f)
    }
}

impl<T: Clone + Sync, const N: usize> Sequence for [T; N] {
    type Item = T;

    fn len(&self) -> usize {
        N
    }

    fn try_fold_range<B, E, F>(&self, range: Range<usize>, init: B, f: F) -> Result<B, E>
    where
        F: FnMut(B, T) -> Result<B, E>,
    {
        self.as_slice().try_fold_range(range, init, f)
    }
}

impl<T: Clone + Sync> Sequence for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn try_fold_range<B, E, F>(&self, range: Range<usize>, init: B, f: F) -> Result<B, E>
    where
        F: FnMut(B, T) -> Result<B, E>,
    {
        self.as_slice().try_fold_range(range, init, f)
    }
}

impl<T: Clone + Sync> Sequence for VecDeque<T> {
    type Item = T;

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn try_fold_range<B, E, F>(&self, range: Range<usize>, init: B, f: F) -> Result<B, E>
    where
        F: FnMut(B, T) -> Result<B, E>,
    {
        self.range(range).cloned().try_fold(init, f)
    }
}

macro_rules! impl_range_sequence {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sequence for Range<$ty> {
                type Item = $ty;

                fn len(&self) -> usize {
                    self.end.saturating_sub(self.start) as usize
                }

                fn try_fold_range<B, E, F>(
                    &self,
                    range: Range<usize>,
                    init: B,
                    f: F,
                ) -> Result<B, E>
                where
                    F: FnMut(B, $ty) -> Result<B, E>,
                {
                    let begin = self.start + range.start as $ty;
                    let end = self.start + range.end as $ty;
                    (begin..end).try_fold(init, f)
                }
            }
        )*
    };
}

impl_range_sequence!(u32, usize);

// A `u64` range can be longer than `usize::MAX` on narrower targets, where its
// length would not be representable.
#[cfg(target_pointer_width = "64")]
impl_range_sequence!(u64);
