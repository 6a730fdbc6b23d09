use core::{num::NonZeroUsize, ops::Range};

/// A contiguous, half-open range of sequence indices assigned to one worker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Position of this partition in the ordered partition list. Partial
    /// results are combined in ascending `index` order.
    pub index: usize,
    /// The `[begin, end)` range of sequence indices.
    pub range: Range<usize>,
}

impl Partition {
    /// First index covered by this partition.
    pub const fn begin(&self) -> usize {
        self.range.start
    }

    /// One past the last index covered by this partition.
    pub const fn end(&self) -> usize {
        self.range.end
    }

    /// Number of elements in this partition.
    pub const fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    /// Returns `true` if the partition covers no elements.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits `len` elements into exactly `workers` contiguous partitions.
///
/// Every partition but the last spans `len / workers` elements. The last
/// partition always ends at `len` and absorbs the remainder. When `len` is
/// smaller than `workers` the block size is zero, so all partitions except
/// the last are empty and the last one covers the whole sequence.
///
/// The returned partitions are ordered by `begin`, never overlap, and their
/// union is exactly `[0, len)`.
///
/// # Example
///
/// ```
/// use core::num::NonZeroUsize;
/// use splitfold::partition;
///
/// let parts = partition(5, NonZeroUsize::new(3).unwrap());
/// let ranges: Vec<_> = parts.iter().map(|p| p.range.clone()).collect();
/// assert_eq!(ranges, [0..1, 1..2, 2..5]);
///
/// let parts = partition(6, NonZeroUsize::new(3).unwrap());
/// let ranges: Vec<_> = parts.iter().map(|p| p.range.clone()).collect();
/// assert_eq!(ranges, [0..2, 2..4, 4..6]);
/// ```
pub fn partition(len: usize, workers: NonZeroUsize) -> Vec<Partition> {
    let workers = workers.get();
    let block = len / workers;

    (0..workers)
        .map(|index| {
            let begin = index * block;
            let end = if index == workers - 1 {
                len
            } else {
                begin + block
            };
            Partition {
                index,
                range: begin..end,
            }
        })
        .collect()
}
