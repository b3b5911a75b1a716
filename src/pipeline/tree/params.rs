//! Decision tree hyperparameters

use serde::Serialize;

use crate::pipeline::PipelineError;

/// Deepest tree the builder accepts
pub const MAX_TREE_DEPTH: usize = 30;

/// Hyperparameters for fitting a `DecisionTree`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionTreeParams {
    /// Maximum depth; 0 fits a single leaf
    pub max_depth: usize,
    /// Minimum rows each child of a split must hold
    pub min_instances_per_node: usize,
    /// Minimum impurity decrease for a split to be kept
    pub min_info_gain: f64,
    /// Maximum number of bins per feature; thresholds are `max_bins - 1`
    /// candidates drawn from the training data
    pub max_bins: usize,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_instances_per_node: 1,
            min_info_gain: 0.0,
            max_bins: 32,
        }
    }
}

impl DecisionTreeParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn min_instances_per_node(mut self, min_instances: usize) -> Self {
        self.min_instances_per_node = min_instances;
        self
    }

    pub fn min_info_gain(mut self, min_info_gain: f64) -> Self {
        self.min_info_gain = min_info_gain;
        self
    }

    pub fn max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_depth > MAX_TREE_DEPTH {
            return Err(PipelineError::InvalidTreeParams(format!(
                "max_depth must be at most {}, got {}",
                MAX_TREE_DEPTH, self.max_depth
            )));
        }
        if self.min_instances_per_node == 0 {
            return Err(PipelineError::InvalidTreeParams(
                "min_instances_per_node must be at least 1".to_string(),
            ));
        }
        if !self.min_info_gain.is_finite() || self.min_info_gain < 0.0 {
            return Err(PipelineError::InvalidTreeParams(format!(
                "min_info_gain must be a non-negative number, got {}",
                self.min_info_gain
            )));
        }
        if self.max_bins < 2 {
            return Err(PipelineError::InvalidTreeParams(format!(
                "max_bins must be at least 2, got {}",
                self.max_bins
            )));
        }
        Ok(())
    }
}
