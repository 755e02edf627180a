//! Level-wise frequent itemset mining

use crate::data::Transactions;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Items appearing together in at least `min_support` of all baskets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentItemset {
    /// Sorted item names
    pub items: Vec<String>,
    /// Share of baskets containing every item
    pub support: f64,
}

/// Mine every itemset with support `>= min_support`.
///
/// Itemsets are returned level by level (singletons first), sorted
/// lexicographically within a level.
pub fn apriori(transactions: &Transactions, min_support: f64) -> Vec<FrequentItemset> {
    let n = transactions.len();
    if n == 0 {
        return Vec::new();
    }

    let vocabulary: Vec<&str> = transactions
        .baskets()
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let baskets: Vec<BTreeSet<usize>> = transactions
        .baskets()
        .iter()
        .map(|basket| {
            basket
                .iter()
                .filter_map(|item| vocabulary.binary_search(&item.as_str()).ok())
                .collect()
        })
        .collect();

    let support_of = |itemset: &[usize]| -> f64 {
        let count = baskets
            .iter()
            .filter(|basket| itemset.iter().all(|i| basket.contains(i)))
            .count();
        count as f64 / n as f64
    };

    let mut frequent: Vec<(Vec<usize>, f64)> = Vec::new();
    let mut level: Vec<Vec<usize>> = (0..vocabulary.len())
        .map(|i| vec![i])
        .filter(|candidate| support_of(candidate.as_slice()) >= min_support)
        .collect();

    while !level.is_empty() {
        for itemset in &level {
            frequent.push((itemset.clone(), support_of(itemset.as_slice())));
        }
        debug!(size = level[0].len(), count = level.len(), "frequent itemsets");
        level = next_level(&level)
            .into_iter()
            .filter(|candidate| support_of(candidate.as_slice()) >= min_support)
            .collect();
    }

    frequent
        .into_iter()
        .map(|(itemset, support)| FrequentItemset {
            items: itemset.iter().map(|&i| vocabulary[i].to_string()).collect(),
            support,
        })
        .collect()
}

/// Join itemsets sharing all but their last item, then drop candidates with
/// an infrequent subset.
fn next_level(level: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let known: HashSet<&[usize]> = level.iter().map(Vec::as_slice).collect();
    let mut candidates = Vec::new();

    for (i, a) in level.iter().enumerate() {
        for b in &level[i + 1..] {
            let k = a.len();
            if a[..k - 1] != b[..k - 1] {
                continue;
            }
            let mut candidate = a.clone();
            candidate.push(b[k - 1]);
            candidate.sort_unstable();

            let all_subsets_frequent = (0..candidate.len()).all(|skip| {
                let subset: Vec<usize> = candidate
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != skip)
                    .map(|(_, &item)| item)
                    .collect();
                known.contains(subset.as_slice())
            });
            if all_subsets_frequent {
                candidates.push(candidate);
            }
        }
    }

    candidates.sort();
    candidates.dedup();
    candidates
}
