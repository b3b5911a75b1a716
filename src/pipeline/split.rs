//! Seeded random partitioning of rows into train/test sets

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::PipelineError;

/// Row indices of the train and test partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition `n_rows` rows by weight.
///
/// Each row draws one uniform number from a generator seeded with `seed` and
/// lands in the first partition whose cumulative normalized weight exceeds
/// the draw. Partition sizes follow the weights only in expectation; the same
/// seed and row count always reproduce the same assignment.
pub fn random_split(n_rows: usize, weights: &[f64], seed: u64) -> Result<Vec<Vec<usize>>> {
    validate_weights(weights)?;

    let total: f64 = weights.iter().sum();
    let mut bounds: Vec<f64> = weights
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w / total;
            Some(*acc)
        })
        .collect();
    // Guard against rounding leaving the last bound just under 1
    if let Some(last) = bounds.last_mut() {
        *last = f64::INFINITY;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut partitions: Vec<Vec<usize>> = vec![Vec::new(); weights.len()];
    for row in 0..n_rows {
        let draw: f64 = rng.gen();
        let slot = bounds.iter().position(|&b| draw < b).unwrap_or(weights.len() - 1);
        partitions[slot].push(row);
    }

    Ok(partitions)
}

/// Two-way split with `train_ratio` of rows (in expectation) going to train
pub fn train_test_split(n_rows: usize, train_ratio: f64, seed: u64) -> Result<TrainTestSplit> {
    let mut parts = random_split(n_rows, &[train_ratio, 1.0 - train_ratio], seed)?;
    let test = parts.pop().unwrap_or_default();
    let train = parts.pop().unwrap_or_default();
    Ok(TrainTestSplit { train, test })
}

fn validate_weights(weights: &[f64]) -> Result<()> {
    let invalid = |reason: &str| -> anyhow::Error {
        PipelineError::InvalidSplitWeights {
            weights: weights.to_vec(),
            reason: reason.to_string(),
        }
        .into()
    };

    if weights.is_empty() {
        return Err(invalid("at least one weight is required"));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(invalid("weights must be finite and non-negative"));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(invalid("weights must sum to a positive value"));
    }
    Ok(())
}
