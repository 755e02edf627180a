//! Regression trees used as boosting stages
//!
//! Trees are grown greedily on squared error. Nodes live in a flat arena and
//! refer to their children by index.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;

/// Growth limits of a single tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

/// Tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf {
        value: f64,
    },
    /// Rows with `row[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Grow a tree on `rows` and `targets`.
    ///
    /// Features are visited in an order shuffled by `rng` at every node; among
    /// equally good splits the first one visited wins.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], params: &TreeParams, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        if rows.is_empty() || rows.len() != targets.len() {
            tree.nodes.push(Node::Leaf { value: 0.0 });
            return tree;
        }

        let indices: Vec<usize> = (0..rows.len()).collect();
        tree.grow(rows, targets, indices, 0, params, rng);
        tree
    }

    /// Prediction for one row
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Depth of the deepest leaf, 0 for a single leaf
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    fn grow(
        &mut self,
        rows: &[Vec<f64>],
        targets: &[f64],
        indices: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let n = indices.len() as f64;
        let value = indices.iter().map(|&i| targets[i]).sum::<f64>() / n;
        let slot = self.nodes.len();
        self.nodes.push(Node::Leaf { value });

        if depth >= params.max_depth || indices.len() < params.min_samples_split {
            return slot;
        }
        let first = targets[indices[0]];
        if indices.iter().all(|&i| targets[i] == first) {
            return slot;
        }

        let best = match best_split(rows, targets, &indices, params.min_samples_leaf, rng) {
            Some(candidate) if candidate.gain > 0.0 => candidate,
            _ => return slot,
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| rows[i][best.feature] <= best.threshold);

        let left = self.grow(rows, targets, left_rows, depth + 1, params, rng);
        let right = self.grow(rows, targets, right_rows, depth + 1, params, rng);
        self.nodes[slot] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        slot
    }
}

/// Best squared-error split of `indices`, if any respects `min_leaf`
fn best_split(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    min_leaf: usize,
    rng: &mut StdRng,
) -> Option<Candidate> {
    let n = indices.len();
    let n_features = rows[indices[0]].len();
    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let baseline = total * total / n as f64;

    let mut features: Vec<usize> = (0..n_features).collect();
    features.shuffle(rng);

    let mut best: Option<Candidate> = None;
    let mut order = indices.to_vec();
    for feature in features {
        order.sort_by(|&a, &b| {
            rows[a][feature]
                .partial_cmp(&rows[b][feature])
                .unwrap_or(Ordering::Equal)
        });

        let mut left_sum = 0.0;
        for split in 1..n {
            left_sum += targets[order[split - 1]];
            let lower = rows[order[split - 1]][feature];
            let upper = rows[order[split]][feature];
            if split < min_leaf || n - split < min_leaf || lower >= upper {
                continue;
            }

            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / split as f64
                + right_sum * right_sum / (n - split) as f64
                - baseline;
            if best.map_or(true, |b| gain > b.gain) {
                best = Some(Candidate {
                    feature,
                    threshold: (lower + upper) / 2.0,
                    gain,
                });
            }
        }
    }
    best
}
