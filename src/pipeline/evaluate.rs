//! Model evaluation: ROC AUC and the depth sweep

use anyhow::{Context, Result};
use serde::Serialize;

use super::tree::{DecisionTree, DecisionTreeParams};
use super::FeatureMatrix;
use crate::utils::{create_progress_bar, finish_with_success};

/// Train/test AUC for one tree depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricPoint {
    pub depth: usize,
    pub train_auc: f64,
    pub test_auc: f64,
}

/// AUC measurements across a range of depths, in sweep order
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricCurve {
    pub points: Vec<MetricPoint>,
}

impl MetricCurve {
    /// Point with the highest test AUC; the shallowest depth wins ties
    pub fn best(&self) -> Option<&MetricPoint> {
        self.points
            .iter()
            .fold(None, |best: Option<&MetricPoint>, point| match best {
                Some(b) if b.test_auc >= point.test_auc => Some(b),
                _ => Some(point),
            })
    }

    pub fn depths(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.depth).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Area under the ROC curve of `scores` against 0/1 `labels`.
///
/// Computed as the normalized Mann-Whitney U statistic, with tied scores
/// sharing their average rank. Returns 0.5 when either class is absent.
pub fn area_under_roc(scores: &[f64], labels: &[u8]) -> f64 {
    debug_assert_eq!(scores.len(), labels.len());

    let mut pairs: Vec<(f64, u8)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n_pos = pairs.iter().filter(|(_, l)| *l == 1).count() as f64;
    let n_neg = pairs.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return 0.5;
    }

    let n = pairs.len();
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && pairs[j].0 == pairs[i].0 {
            j += 1;
        }

        // Ranks are 1-based; the group spans ranks i+1..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let positives = pairs[i..j].iter().filter(|(_, l)| *l == 1).count() as f64;
        rank_sum_pos += avg_rank * positives;

        i = j;
    }

    let u = rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0;
    u / (n_pos * n_neg)
}

/// AUC of a fitted tree's scores on a labeled matrix
pub fn evaluate_auc(tree: &DecisionTree, data: &FeatureMatrix) -> f64 {
    area_under_roc(&tree.predict_scores(data), &data.labels)
}

/// Fit one tree per depth and record its train and test AUC.
///
/// All parameters other than depth come from `base_params`.
pub fn evaluate_depths(
    train: &FeatureMatrix,
    test: &FeatureMatrix,
    depths: &[usize],
    base_params: &DecisionTreeParams,
) -> Result<MetricCurve> {
    let pb = create_progress_bar(depths.len() as u64, "Sweeping tree depth");

    let mut points = Vec::with_capacity(depths.len());
    for &depth in depths {
        pb.set_message(format!("Fitting depth {}", depth));
        let params = base_params.max_depth(depth);
        let tree = DecisionTree::fit(&params, train)
            .with_context(|| format!("Failed to fit tree at depth {}", depth))?;

        points.push(MetricPoint {
            depth,
            train_auc: evaluate_auc(&tree, train),
            test_auc: evaluate_auc(&tree, test),
        });
        pb.inc(1);
    }

    finish_with_success(&pb, &format!("Evaluated {} depths", depths.len()));
    Ok(MetricCurve { points })
}

/// Fitted model plus its held-out and in-sample AUC
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub tree: DecisionTree,
    pub train_auc: f64,
    pub test_auc: f64,
}

/// Fit the reported model and score it on both partitions
pub fn fit_final_model(
    train: &FeatureMatrix,
    test: &FeatureMatrix,
    params: &DecisionTreeParams,
) -> Result<FittedModel> {
    let tree = DecisionTree::fit(params, train).context("Failed to fit final model")?;
    let train_auc = evaluate_auc(&tree, train);
    let test_auc = evaluate_auc(&tree, test);
    Ok(FittedModel {
        tree,
        train_auc,
        test_auc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auc_perfect_ranking() {
        assert_eq!(area_under_roc(&[0.1, 0.2, 0.8, 0.9], &[0, 0, 1, 1]), 1.0);
    }

    #[test]
    fn test_auc_inverted_ranking() {
        assert_eq!(area_under_roc(&[0.9, 0.8, 0.2, 0.1], &[0, 0, 1, 1]), 0.0);
    }

    #[test]
    fn test_auc_all_tied_is_half() {
        assert_eq!(area_under_roc(&[0.5; 6], &[0, 1, 0, 1, 1, 0]), 0.5);
    }

    #[test]
    fn test_auc_partial_ties() {
        // One positive ties with one negative: 3 of 4 pairs ordered, 1 tied
        let auc = area_under_roc(&[0.2, 0.5, 0.5, 0.9], &[0, 0, 1, 1]);
        assert!((auc - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_auc_single_class_is_half() {
        assert_eq!(area_under_roc(&[0.1, 0.9], &[1, 1]), 0.5);
        assert_eq!(area_under_roc(&[], &[]), 0.5);
    }

    #[test]
    fn test_curve_best_prefers_shallow_on_tie() {
        let curve = MetricCurve {
            points: vec![
                MetricPoint { depth: 2, train_auc: 0.7, test_auc: 0.8 },
                MetricPoint { depth: 3, train_auc: 0.8, test_auc: 0.8 },
                MetricPoint { depth: 4, train_auc: 0.9, test_auc: 0.75 },
            ],
        };
        assert_eq!(curve.best().map(|p| p.depth), Some(2));
        assert_eq!(curve.depths(), vec![2, 3, 4]);
        assert!(MetricCurve::default().best().is_none());
    }

    #[test]
    fn test_evaluate_depths_on_separable_data() {
        let rows: Vec<Vec<f64>> = (0..60).map(|i| vec![i as f64]).collect();
        let labels: Vec<u8> = (0..60).map(|i| u8::from(i >= 30)).collect();
        let data = FeatureMatrix::from_rows(vec!["x".into()], &rows, labels).unwrap();

        let curve = evaluate_depths(&data, &data, &[0, 1, 2], &DecisionTreeParams::default()).unwrap();

        assert_eq!(curve.depths(), vec![0, 1, 2]);
        assert_eq!(curve.points[0].train_auc, 0.5);
        assert_eq!(curve.points[1].train_auc, 1.0);
        assert_eq!(curve.points[2].test_auc, 1.0);
    }

    #[test]
    fn test_fit_final_model_scores_both_partitions() {
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let labels: Vec<u8> = (0..20).map(|i| u8::from(i % 2 == 0)).collect();
        let data = FeatureMatrix::from_rows(vec!["x".into()], &rows, labels).unwrap();

        let model = fit_final_model(&data, &data, &DecisionTreeParams::new().max_depth(3)).unwrap();
        assert!(model.tree.depth() <= 3);
        assert!((0.0..=1.0).contains(&model.train_auc));
        assert_eq!(model.train_auc, model.test_auc);
    }
}
