//! Association rules derived from frequent itemsets

use crate::apriori::FrequentItemset;
use crate::config::AprioriConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// `antecedent => consequent` with its strength measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: Vec<String>,
    pub consequent: Vec<String>,
    /// Support of antecedent and consequent together
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    /// `None` when confidence is 1 (infinite conviction)
    pub conviction: Option<f64>,
}

/// Split every frequent itemset of two or more items into rules, keep those
/// passing the confidence and lift thresholds, and return the strongest
/// `max_rules` by lift.
pub fn association_rules(itemsets: &[FrequentItemset], config: &AprioriConfig) -> Vec<AssociationRule> {
    let support: HashMap<&[String], f64> = itemsets
        .iter()
        .map(|set| (set.items.as_slice(), set.support))
        .collect();

    let mut rules = Vec::new();
    for itemset in itemsets.iter().filter(|set| set.items.len() >= 2) {
        let size = itemset.items.len();
        for mask in 1..(1u64 << size) - 1 {
            let (antecedent, consequent): (Vec<String>, Vec<String>) = itemset
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| (mask & (1 << i) != 0, item))
                .fold((Vec::new(), Vec::new()), |(mut left, mut right), (in_left, item)| {
                    if in_left {
                        left.push(item.clone());
                    } else {
                        right.push(item.clone());
                    }
                    (left, right)
                });

            let (Some(&antecedent_support), Some(&consequent_support)) = (
                support.get(antecedent.as_slice()),
                support.get(consequent.as_slice()),
            ) else {
                continue;
            };

            let confidence = itemset.support / antecedent_support;
            let lift = confidence / consequent_support;
            if confidence < config.min_confidence || lift < config.min_lift {
                continue;
            }
            let conviction = if confidence >= 1.0 {
                None
            } else {
                Some((1.0 - consequent_support) / (1.0 - confidence))
            };

            rules.push(AssociationRule {
                antecedent,
                consequent,
                support: itemset.support,
                confidence,
                lift,
                conviction,
            });
        }
    }

    rules.sort_by(|a, b| b.lift.partial_cmp(&a.lift).unwrap_or(Ordering::Equal));
    rules.truncate(config.max_rules);
    rules
}
