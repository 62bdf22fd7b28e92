use std::collections::HashMap;

/// A single `(token, count)` row of a top-N result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub token: String,
    pub count: u64,
}

impl Entry {
    pub fn new(token: impl Into<String>, count: u64) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }
}

/// Returns the `n` highest-counted tokens, highest first
///
/// Keeps a ranked buffer of at most `n` candidates and walks the table once; an entry only
/// enters the buffer when there is room or when it outranks the weakest held candidate, which
/// is then evicted. Work is `O(distinct * n)`, and `n` is expected to be small.
///
/// # Ties
///
/// Entries with equal counts are ranked by token in ascending byte order, so the result is the
/// same regardless of the map's iteration order.
pub fn select_top_n(counts: &HashMap<String, u64>, n: usize) -> Vec<Entry> {
    if n == 0 || counts.is_empty() {
        return Vec::new();
    }

    let mut top: Vec<Entry> = Vec::with_capacity(n.min(counts.len()) + 1);
    for (token, &count) in counts {
        if top.len() == n && !outranks(token, count, &top[n - 1]) {
            continue;
        }

        let pos = top
            .iter()
            .position(|held| outranks(token, count, held))
            .unwrap_or(top.len());

        top.insert(pos, Entry::new(token.as_str(), count));
        top.truncate(n);
    }

    top
}

#[inline]
fn outranks(token: &str, count: u64, held: &Entry) -> bool {
    count > held.count || (count == held.count && token < held.token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs
            .iter()
            .map(|(token, count)| (token.to_string(), *count))
            .collect()
    }

    /// Reference ranking: a full sort by the same order `select_top_n` promises
    fn full_sort(counts: &HashMap<String, u64>) -> Vec<Entry> {
        let mut all: Vec<Entry> = counts
            .iter()
            .map(|(token, count)| Entry::new(token.as_str(), *count))
            .collect();
        all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
        all
    }

    #[test]
    fn test_top_two_of_three() {
        let counts = table(&[("a", 3), ("b", 2), ("c", 1)]);
        let top = select_top_n(&counts, 2);

        assert_eq!(top, vec![Entry::new("a", 3), Entry::new("b", 2)]);
    }

    #[test]
    fn test_n_larger_than_table() {
        let counts = table(&[("yes", 4), ("no", 9)]);
        let top = select_top_n(&counts, 5);

        assert_eq!(top.len(), 2);
        assert_eq!(top, vec![Entry::new("no", 9), Entry::new("yes", 4)]);
    }

    #[test]
    fn test_empty_inputs() {
        let empty = HashMap::new();
        for n in [0, 1, 5, 100] {
            assert!(select_top_n(&empty, n).is_empty());
        }

        let counts = table(&[("a", 1)]);
        assert!(select_top_n(&counts, 0).is_empty());
    }

    #[test]
    fn test_ties_rank_by_token() {
        let counts = table(&[("d", 2), ("b", 2), ("a", 1), ("c", 2), ("e", 5)]);

        let top = select_top_n(&counts, 3);
        assert_eq!(
            top,
            vec![Entry::new("e", 5), Entry::new("b", 2), Entry::new("c", 2)]
        );

        // every token tied: lowest tokens win
        let flat = table(&[("z", 1), ("x", 1), ("y", 1), ("w", 1)]);
        let top = select_top_n(&flat, 2);
        assert_eq!(top, vec![Entry::new("w", 1), Entry::new("x", 1)]);
    }

    #[test]
    fn test_matches_full_sort() {
        // small deterministic LCG so the tables vary without pulling in an rng
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            state >> 33
        };

        for round in 0..50 {
            let distinct = (next() % 40) as usize;
            let mut counts = HashMap::new();
            for i in 0..distinct {
                counts.insert(format!("tok{}", i), next() % 8);
            }

            let expected = full_sort(&counts);
            for n in [0, 1, 2, 5, 10, 64] {
                let top = select_top_n(&counts, n);
                let want = &expected[..n.min(expected.len())];

                assert_eq!(top.len(), n.min(counts.len()), "round {} n {}", round, n);
                assert_eq!(top.as_slice(), want, "round {} n {}", round, n);
            }
        }
    }

    #[test]
    fn test_result_entries_come_from_table() {
        let counts = table(&[("PogChamp", 12), ("1", 7), ("2", 7), ("KEKW", 3), ("F", 30)]);
        let top = select_top_n(&counts, 4);

        for pair in top.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }

        for entry in &top {
            assert_eq!(counts.get(&entry.token), Some(&entry.count));
        }
    }
}
