//! Run configuration for the churn pipeline

use serde::Serialize;

use super::tree::{DecisionTreeParams, MAX_TREE_DEPTH};
use super::PipelineError;

/// Settings that drive one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineConfig {
    /// Binary label column
    pub label: String,
    /// Row identifier, excluded from the features
    pub identifier: Option<String>,
    /// Columns filled with their mean
    pub impute_columns: Vec<String>,
    pub outlier_column: String,
    /// Rows with `outlier_column` above this are dropped
    pub outlier_threshold: f64,
    pub train_ratio: f64,
    pub seed: u64,
    pub min_depth: usize,
    pub max_depth: usize,
    /// Depth of the model whose importances are reported
    pub final_depth: usize,
    /// Report importances from the best swept depth instead of `final_depth`
    pub importance_from_best: bool,
    pub max_bins: usize,
    pub min_instances_per_node: usize,
    pub min_info_gain: f64,
    pub histogram_bins: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Churn".to_string(),
            identifier: Some("customerID".to_string()),
            impute_columns: vec!["TotalCharges".to_string()],
            outlier_column: "tenure".to_string(),
            outlier_threshold: 100.0,
            train_ratio: 0.7,
            seed: 100,
            min_depth: 2,
            max_depth: 20,
            final_depth: 3,
            importance_from_best: false,
            max_bins: 32,
            min_instances_per_node: 1,
            min_info_gain: 0.0,
            histogram_bins: 20,
        }
    }
}

impl PipelineConfig {
    /// Depths visited by the sweep, in order
    pub fn depths(&self) -> Vec<usize> {
        (self.min_depth..=self.max_depth).collect()
    }

    /// Tree parameters shared by every fit; depth is set per fit
    pub fn tree_params(&self) -> DecisionTreeParams {
        DecisionTreeParams::new()
            .max_depth(self.final_depth)
            .max_bins(self.max_bins)
            .min_instances_per_node(self.min_instances_per_node)
            .min_info_gain(self.min_info_gain)
    }

    /// Columns never used as features
    pub fn excluded_columns(&self) -> Vec<String> {
        self.identifier.iter().cloned().collect()
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(PipelineError::InvalidSplitWeights {
                weights: vec![self.train_ratio, 1.0 - self.train_ratio],
                reason: "train ratio must lie strictly between 0 and 1".to_string(),
            });
        }
        if self.min_depth > self.max_depth {
            return Err(PipelineError::InvalidTreeParams(format!(
                "min depth {} exceeds max depth {}",
                self.min_depth, self.max_depth
            )));
        }
        if self.max_depth > MAX_TREE_DEPTH || self.final_depth > MAX_TREE_DEPTH {
            return Err(PipelineError::InvalidTreeParams(format!(
                "depths must be at most {}",
                MAX_TREE_DEPTH
            )));
        }
        if self.histogram_bins == 0 {
            return Err(PipelineError::InvalidTreeParams(
                "histogram bins must be at least 1".to_string(),
            ));
        }
        if !self.outlier_threshold.is_finite() {
            return Err(PipelineError::InvalidTreeParams(format!(
                "outlier threshold must be finite, got {}",
                self.outlier_threshold
            )));
        }
        self.tree_params().validate()
    }
}
