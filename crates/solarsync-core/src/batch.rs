// ── Batch partitioning ──
//
// Splits the plant-id list into contiguous batches. The fetcher pauses
// between batches, so the batch count bounds the number of pauses.

/// How the id list is split into batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStrategy {
    /// Split into at most this many batches; the last one absorbs the
    /// remainder.
    Partitions(usize),
    /// Fixed target batch size; the last batch may be shorter.
    Size(usize),
}

impl Default for BatchStrategy {
    fn default() -> Self {
        Self::Partitions(4)
    }
}

/// Partition `items` into contiguous, non-empty batches.
///
/// For `Partitions(p)`: `size = max(1, n / p)`, batch `i` starts at
/// `i * size`, and the final batch runs to the end of the list. An empty
/// input yields no batches. A zero in either strategy is treated as 1.
pub fn partition<T>(items: &[T], strategy: BatchStrategy) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }

    match strategy {
        BatchStrategy::Size(size) => items.chunks(size.max(1)).collect(),
        BatchStrategy::Partitions(partitions) => {
            let partitions = partitions.max(1);
            let n = items.len();
            let size = (n / partitions).max(1);

            let mut batches = Vec::with_capacity(partitions.min(n));
            for i in 0..partitions {
                let start = i * size;
                if start >= n {
                    break;
                }
                let end = if i + 1 == partitions {
                    n
                } else {
                    (start + size).min(n)
                };
                batches.push(&items[start..end]);
            }
            batches
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sizes(n: usize, strategy: BatchStrategy) -> Vec<usize> {
        let items: Vec<usize> = (0..n).collect();
        partition(&items, strategy).iter().map(|b| b.len()).collect()
    }

    #[test]
    fn last_partition_absorbs_remainder() {
        assert_eq!(sizes(10, BatchStrategy::Partitions(4)), vec![2, 2, 2, 4]);
    }

    #[test]
    fn fewer_items_than_partitions() {
        assert_eq!(sizes(3, BatchStrategy::Partitions(4)), vec![1, 1, 1]);
    }

    #[test]
    fn empty_input_has_no_batches() {
        assert!(sizes(0, BatchStrategy::Partitions(4)).is_empty());
        assert!(sizes(0, BatchStrategy::Size(5)).is_empty());
    }

    #[test]
    fn fixed_size_batches() {
        assert_eq!(sizes(7, BatchStrategy::Size(3)), vec![3, 3, 1]);
        assert_eq!(sizes(2, BatchStrategy::Size(0)), vec![1, 1]);
    }

    #[test]
    fn partitions_cover_input_in_order() {
        for n in 0..60 {
            for p in 1..9 {
                let items: Vec<usize> = (0..n).collect();
                let batches = partition(&items, BatchStrategy::Partitions(p));

                assert!(batches.len() <= p, "n={n} p={p}");
                assert!(batches.iter().all(|b| !b.is_empty()), "n={n} p={p}");

                let flattened: Vec<usize> = batches.concat();
                assert_eq!(flattened, items, "n={n} p={p}");
            }
        }
    }
}
