//! Static interval-overlap index.
//!
//! Entries are sorted by `begin` and laid out as an implicit balanced tree over the sorted
//! array: the root of `[lo, hi)` is its midpoint. Each entry caches `limit`, the largest `end`
//! inside its subtree, so whole subtrees that finish before a query starts are skipped.
//! Intervals are half-open (`[begin, end)`).

#[derive(Debug, Clone)]
struct Entry<T> {
    begin: f64,
    end: f64,
    limit: f64,
    value: T,
}

#[derive(Debug, Clone)]
pub struct IntervalIndex<T> {
    entries: Vec<Entry<T>>,
}

impl<T> IntervalIndex<T> {
    pub fn new(intervals: impl IntoIterator<Item = (f64, f64, T)>) -> Self {
        let mut entries: Vec<Entry<T>> = intervals
            .into_iter()
            .map(|(begin, end, value)| Entry {
                begin,
                end,
                limit: end,
                value,
            })
            .collect();
        entries.sort_by(|a, b| a.begin.total_cmp(&b.begin));
        let len = entries.len();
        build_limits(&mut entries, 0, len);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values whose interval intersects `[begin, end)`, in ascending `begin` order.
    pub fn query(&self, begin: f64, end: f64) -> Vec<&T> {
        let mut hits: Vec<usize> = Vec::new();
        let mut stack = vec![(0, self.entries.len())];
        while let Some((lo, hi)) = stack.pop() {
            if lo >= hi {
                continue;
            }
            let mid = lo + (hi - lo) / 2;
            let entry = &self.entries[mid];
            if entry.limit <= begin {
                continue;
            }
            stack.push((lo, mid));
            if entry.begin < end {
                if entry.end > begin {
                    hits.push(mid);
                }
                stack.push((mid + 1, hi));
            }
        }
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.entries[i].value).collect()
    }
}

/// Fills `limit` for the implicit subtree over `[lo, hi)` and returns its maximum end.
fn build_limits<T>(entries: &mut [Entry<T>], lo: usize, hi: usize) -> f64 {
    if lo >= hi {
        return f64::NEG_INFINITY;
    }
    let mid = lo + (hi - lo) / 2;
    let left = build_limits(entries, lo, mid);
    let right = build_limits(entries, mid + 1, hi);
    let limit = entries[mid].end.max(left).max(right);
    entries[mid].limit = limit;
    limit
}
