//! CART decision tree classifier for binary labels
//!
//! Splits are axis-aligned (`feature <= threshold` goes left) and chosen to
//! maximize the decrease in Gini impurity. Leaves score rows with the
//! fraction of positive training rows they hold.

mod builder;
mod params;

pub use builder::find_candidate_thresholds;
pub use params::{DecisionTreeParams, MAX_TREE_DEPTH};

use std::fmt::Write;

use anyhow::Result;

use super::FeatureMatrix;

/// Negative/positive row counts reaching a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub negatives: usize,
    pub positives: usize,
}

impl ClassCounts {
    pub fn new(negatives: usize, positives: usize) -> Self {
        Self {
            negatives,
            positives,
        }
    }

    pub fn total(&self) -> usize {
        self.negatives + self.positives
    }

    pub fn add(&mut self, label: u8) {
        if label == 1 {
            self.positives += 1;
        } else {
            self.negatives += 1;
        }
    }

    /// Gini impurity: `1 - p0² - p1²`, which for two classes is `2p(1-p)`
    pub fn gini(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let p = self.positives as f64 / total as f64;
        2.0 * p * (1.0 - p)
    }

    /// Fraction of positive rows; 0 for an empty node
    pub fn positive_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.positives as f64 / total as f64
        }
    }

    /// Majority class; ties go to the negative class
    pub fn prediction(&self) -> u8 {
        u8::from(self.positives > self.negatives)
    }
}

/// A node of a fitted tree
#[derive(Debug, Clone)]
pub enum Node {
    Leaf {
        counts: ClassCounts,
    },
    Split {
        feature: usize,
        threshold: f64,
        /// Impurity decrease achieved by this split
        gain: f64,
        counts: ClassCounts,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn counts(&self) -> ClassCounts {
        match self {
            Node::Leaf { counts } | Node::Split { counts, .. } => *counts,
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn num_nodes(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.num_nodes() + right.num_nodes(),
        }
    }
}

/// A fitted binary decision tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Node,
    feature_names: Vec<String>,
    params: DecisionTreeParams,
}

impl DecisionTree {
    /// Fit a tree on the rows and labels of `data`.
    ///
    /// Fails on invalid parameters, an empty matrix, or any non-finite
    /// feature value.
    pub fn fit(params: &DecisionTreeParams, data: &FeatureMatrix) -> Result<Self> {
        builder::fit(params, data)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn params(&self) -> &DecisionTreeParams {
        &self.params
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Depth of the deepest leaf; a single leaf has depth 0
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn num_nodes(&self) -> usize {
        self.root.num_nodes()
    }

    fn leaf_for(&self, row: &[f64]) -> ClassCounts {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { counts } => return *counts,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature] <= *threshold {
                        &**left
                    } else {
                        &**right
                    };
                }
            }
        }
    }

    /// Probability-like score of the positive class for one row
    pub fn predict_score(&self, row: &[f64]) -> f64 {
        self.leaf_for(row).positive_rate()
    }

    /// Scores for every row of a matrix
    pub fn predict_scores(&self, data: &FeatureMatrix) -> Vec<f64> {
        data.rows().map(|row| self.predict_score(row)).collect()
    }

    /// Majority-class prediction for one row
    pub fn predict(&self, row: &[f64]) -> u8 {
        self.leaf_for(row).prediction()
    }

    /// Share of the total weighted impurity decrease credited to each feature.
    ///
    /// Each split contributes `gain * rows_at_node` to its feature. The
    /// result sums to 1 when the tree has at least one split and is all
    /// zeros otherwise.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut importances = vec![0.0; self.feature_names.len()];

        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Node::Split {
                feature,
                gain,
                counts,
                left,
                right,
                ..
            } = node
            {
                importances[*feature] += gain * counts.total() as f64;
                stack.push(&**left);
                stack.push(&**right);
            }
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for value in &mut importances {
                *value /= total;
            }
        }
        importances
    }

    /// Importances paired with feature names, in feature order
    pub fn named_importances(&self) -> Vec<(String, f64)> {
        self.feature_names
            .iter()
            .cloned()
            .zip(self.feature_importances())
            .collect()
    }

    /// Human-readable dump of the split structure
    pub fn to_debug_string(&self) -> String {
        let mut out = format!(
            "DecisionTree: depth={}, numNodes={}, numFeatures={}\n",
            self.depth(),
            self.num_nodes(),
            self.feature_names.len()
        );
        self.write_node(&self.root, 1, &mut out);
        out
    }

    fn write_node(&self, node: &Node, indent: usize, out: &mut String) {
        let pad = " ".repeat(indent);
        match node {
            Node::Leaf { counts } => {
                let _ = writeln!(
                    out,
                    "{}Predict: {} (score {:.4}, n={})",
                    pad,
                    counts.prediction(),
                    counts.positive_rate(),
                    counts.total()
                );
            }
            Node::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                let name = &self.feature_names[*feature];
                let _ = writeln!(out, "{}If ({} <= {})", pad, name, threshold);
                self.write_node(left, indent + 1, out);
                let _ = writeln!(out, "{}Else ({} > {})", pad, name, threshold);
                self.write_node(right, indent + 1, out);
            }
        }
    }
}
