//! Greedy top-down tree construction over pre-binned features
//!
//! Candidate thresholds are computed once per feature from the training data.
//! Every row is then mapped to a bin index, so that the split search at a
//! node is a histogram pass followed by a running sum over bins.

use anyhow::Result;
use rayon::prelude::*;

use super::{ClassCounts, DecisionTree, DecisionTreeParams, Node};
use crate::pipeline::{FeatureMatrix, PipelineError};

/// Best split found for one feature at one node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    /// Index into the feature's thresholds; rows with bin <= this go left
    bin: usize,
    gain: f64,
    left: ClassCounts,
    right: ClassCounts,
}

/// Training rows mapped onto threshold bins
struct BinnedData<'a> {
    data: &'a FeatureMatrix,
    thresholds: Vec<Vec<f64>>,
    /// Row-major bin index per (row, feature)
    bins: Vec<u32>,
}

impl BinnedData<'_> {
    fn bin(&self, row: usize, feature: usize) -> usize {
        self.bins[row * self.data.n_features() + feature] as usize
    }
}

/// Candidate split thresholds for one feature.
///
/// With at most `max_bins - 1` gaps between distinct values every midpoint is
/// a candidate. Otherwise the distinct values are walked in order with their
/// row counts, and a boundary becomes a candidate once the cumulative count
/// reaches the next multiple of `rows / max_bins`. A value holding a large
/// share of the rows still gets a candidate right above it, and any feature
/// with two or more distinct values yields at least one candidate.
pub fn find_candidate_thresholds(values: &[f64], max_bins: usize) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    // (value, rows holding it)
    let mut value_counts: Vec<(f64, usize)> = Vec::new();
    for value in sorted {
        match value_counts.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => value_counts.push((value, 1)),
        }
    }

    if value_counts.len() < 2 {
        return Vec::new();
    }

    let max_splits = max_bins.saturating_sub(1);
    if value_counts.len() - 1 <= max_splits {
        return value_counts
            .windows(2)
            .map(|w| (w[0].0 + w[1].0) / 2.0)
            .collect();
    }

    let stride = values.len() as f64 / max_bins as f64;
    let mut target = stride;
    let mut current = value_counts[0].1 as f64;
    let mut thresholds = Vec::with_capacity(max_splits);

    for pair in value_counts.windows(2) {
        let previous = current;
        current += pair[1].1 as f64;
        // Cut below the next value when stopping here lands closer to the target
        if (previous - target).abs() < (current - target).abs() {
            thresholds.push((pair[0].0 + pair[1].0) / 2.0);
            target += stride;
            if thresholds.len() == max_splits {
                break;
            }
        }
    }
    thresholds
}

/// Fit a tree; see `DecisionTree::fit`
pub(super) fn fit(params: &DecisionTreeParams, data: &FeatureMatrix) -> Result<DecisionTree> {
    params.validate()?;

    if data.n_rows() == 0 {
        return Err(PipelineError::EmptyTrainingSet.into());
    }

    for row in 0..data.n_rows() {
        for (feature, name) in data.feature_names.iter().enumerate() {
            let value = data.value(row, feature);
            if !value.is_finite() {
                return Err(PipelineError::NonFiniteFeature {
                    feature: name.clone(),
                    row,
                    value,
                }
                .into());
            }
        }
    }

    let binned = bin_features(data, params.max_bins);
    let rows: Vec<usize> = (0..data.n_rows()).collect();
    let root = grow(&binned, params, rows, 0);

    Ok(DecisionTree {
        root,
        feature_names: data.feature_names.clone(),
        params: *params,
    })
}

fn bin_features(data: &FeatureMatrix, max_bins: usize) -> BinnedData<'_> {
    let n_features = data.n_features();

    let thresholds: Vec<Vec<f64>> = (0..n_features)
        .into_par_iter()
        .map(|feature| {
            let column: Vec<f64> = (0..data.n_rows()).map(|r| data.value(r, feature)).collect();
            find_candidate_thresholds(&column, max_bins)
        })
        .collect();

    let mut bins = Vec::with_capacity(data.n_rows() * n_features);
    for row in data.rows() {
        for (feature, value) in row.iter().enumerate() {
            // Number of thresholds strictly below the value
            let bin = thresholds[feature].partition_point(|&t| t < *value);
            bins.push(bin as u32);
        }
    }

    BinnedData {
        data,
        thresholds,
        bins,
    }
}

fn grow(binned: &BinnedData<'_>, params: &DecisionTreeParams, rows: Vec<usize>, depth: usize) -> Node {
    let mut counts = ClassCounts::default();
    for &row in &rows {
        counts.add(binned.data.labels[row]);
    }

    if depth >= params.max_depth || counts.gini() == 0.0 {
        return Node::Leaf { counts };
    }

    let best = match find_best_split(binned, params, &rows, counts) {
        Some(candidate) => candidate,
        None => return Node::Leaf { counts },
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .into_iter()
        .partition(|&row| binned.bin(row, best.feature) <= best.bin);
    debug_assert_eq!(left_rows.len(), best.left.total());
    debug_assert_eq!(right_rows.len(), best.right.total());

    Node::Split {
        feature: best.feature,
        threshold: binned.thresholds[best.feature][best.bin],
        gain: best.gain,
        counts,
        left: Box::new(grow(binned, params, left_rows, depth + 1)),
        right: Box::new(grow(binned, params, right_rows, depth + 1)),
    }
}

/// Find the split with the largest impurity decrease at a node.
///
/// Features are scanned in parallel; ties keep the lowest feature index and,
/// within a feature, the lowest threshold.
fn find_best_split(
    binned: &BinnedData<'_>,
    params: &DecisionTreeParams,
    rows: &[usize],
    parent: ClassCounts,
) -> Option<SplitCandidate> {
    let per_feature: Vec<Option<SplitCandidate>> = (0..binned.data.n_features())
        .into_par_iter()
        .map(|feature| best_split_for_feature(binned, params, rows, parent, feature))
        .collect();

    per_feature
        .into_iter()
        .flatten()
        .fold(None, |best: Option<SplitCandidate>, candidate| match best {
            Some(b) if b.gain >= candidate.gain => Some(b),
            _ => Some(candidate),
        })
}

fn best_split_for_feature(
    binned: &BinnedData<'_>,
    params: &DecisionTreeParams,
    rows: &[usize],
    parent: ClassCounts,
    feature: usize,
) -> Option<SplitCandidate> {
    let n_thresholds = binned.thresholds[feature].len();
    if n_thresholds == 0 {
        return None;
    }

    // Bin n_thresholds holds values above the last threshold
    let mut histogram = vec![ClassCounts::default(); n_thresholds + 1];
    for &row in rows {
        histogram[binned.bin(row, feature)].add(binned.data.labels[row]);
    }

    let parent_impurity = parent.gini();
    let total = parent.total() as f64;

    let mut best: Option<SplitCandidate> = None;
    let mut left = ClassCounts::default();

    for (bin, bin_counts) in histogram.iter().take(n_thresholds).enumerate() {
        left.negatives += bin_counts.negatives;
        left.positives += bin_counts.positives;
        let right = ClassCounts::new(parent.negatives - left.negatives, parent.positives - left.positives);

        if left.total() < params.min_instances_per_node || right.total() < params.min_instances_per_node {
            continue;
        }

        let gain = parent_impurity
            - (left.total() as f64 / total) * left.gini()
            - (right.total() as f64 / total) * right.gini();

        if gain <= 0.0 || gain < params.min_info_gain {
            continue;
        }

        if best.map_or(true, |b| gain > b.gain) {
            best = Some(SplitCandidate {
                feature,
                bin,
                gain,
                left,
                right,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[Vec<f64>], labels: &[u8]) -> FeatureMatrix {
        let names = (0..rows[0].len()).map(|i| format!("f{}", i)).collect();
        FeatureMatrix::from_rows(names, rows, labels.to_vec()).unwrap()
    }

    #[test]
    fn test_thresholds_are_midpoints_for_few_values() {
        let thresholds = find_candidate_thresholds(&[3.0, 1.0, 2.0, 2.0, 1.0], 32);
        assert_eq!(thresholds, vec![1.5, 2.5]);
    }

    #[test]
    fn test_thresholds_constant_feature() {
        assert!(find_candidate_thresholds(&[4.0, 4.0, 4.0], 32).is_empty());
    }

    #[test]
    fn test_thresholds_capped_by_max_bins() {
        let values: Vec<f64> = (0..1000).map(|v| v as f64).collect();
        let thresholds = find_candidate_thresholds(&values, 32);

        assert!(thresholds.len() <= 31);
        assert!(!thresholds.is_empty());
        assert!(thresholds.windows(2).all(|w| w[0] < w[1]));
        assert!(thresholds.iter().all(|t| t.fract() == 0.5));
    }

    #[test]
    fn test_thresholds_skewed_feature_keeps_split_above_mass() {
        // 1960 zeros then one row each at 1..=40
        let values: Vec<f64> = std::iter::repeat(0.0)
            .take(1960)
            .chain((1..=40).map(|v| v as f64))
            .collect();
        let thresholds = find_candidate_thresholds(&values, 32);

        assert_eq!(thresholds[0], 0.5);
        assert!(thresholds.len() <= 31);
        assert!(thresholds.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_thresholds_mass_at_maximum() {
        let values: Vec<f64> = (0..40)
            .map(|v| v as f64)
            .chain(std::iter::repeat(100.0).take(1960))
            .collect();
        let thresholds = find_candidate_thresholds(&values, 32);

        assert!(!thresholds.is_empty());
        assert_eq!(*thresholds.last().unwrap(), 69.5);
    }

    #[test]
    fn test_best_split_prefers_lower_feature_on_tie() {
        // Both features separate the labels perfectly
        let data = matrix(
            &[vec![0.0, 0.0], vec![0.0, 0.0], vec![1.0, 1.0], vec![1.0, 1.0]],
            &[0, 0, 1, 1],
        );
        let tree = DecisionTree::fit(&DecisionTreeParams::new().max_depth(1), &data).unwrap();
        match tree.root() {
            Node::Split { feature, .. } => assert_eq!(*feature, 0),
            Node::Leaf { .. } => panic!("expected a split"),
        }
    }

    #[test]
    fn test_min_instances_per_node_blocks_small_children() {
        let data = matrix(
            &[vec![0.0], vec![1.0], vec![2.0], vec![3.0]],
            &[1, 0, 0, 0],
        );
        let params = DecisionTreeParams::new().max_depth(3).min_instances_per_node(2);
        let tree = DecisionTree::fit(&params, &data).unwrap();

        // Isolating the single positive row would leave a child of size 1
        match tree.root() {
            Node::Split { left, right, .. } => {
                assert!(left.counts().total() >= 2);
                assert!(right.counts().total() >= 2);
            }
            Node::Leaf { .. } => {}
        }
    }

    #[test]
    fn test_min_info_gain_prunes_weak_splits() {
        let data = matrix(
            &[vec![0.0], vec![1.0], vec![2.0], vec![3.0]],
            &[0, 1, 0, 1],
        );
        let params = DecisionTreeParams::new().max_depth(3).min_info_gain(0.4);
        let tree = DecisionTree::fit(&params, &data).unwrap();
        assert_eq!(tree.num_nodes(), 1);
    }

    #[test]
    fn test_nan_feature_is_rejected() {
        let data = matrix(&[vec![1.0], vec![f64::NAN]], &[0, 1]);
        let err = DecisionTree::fit(&DecisionTreeParams::default(), &data).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NonFiniteFeature { row: 1, .. })
        ));
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let data = FeatureMatrix::new(vec!["f0".into()], Vec::new(), Vec::new()).unwrap();
        let err = DecisionTree::fit(&DecisionTreeParams::default(), &data).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptyTrainingSet)
        ));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let data = matrix(&[vec![1.0], vec![2.0]], &[0, 1]);
        assert!(DecisionTree::fit(&DecisionTreeParams::new().max_depth(31), &data).is_err());
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let data = matrix(&[vec![1.0], vec![2.0], vec![3.0]], &[1, 1, 1]);
        let tree = DecisionTree::fit(&DecisionTreeParams::new().max_depth(5), &data).unwrap();
        assert_eq!(tree.num_nodes(), 1);
        assert_eq!(tree.predict_score(&[2.0]), 1.0);
    }
}
