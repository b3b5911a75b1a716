//! Tests for the decision tree classifier

use churntree::pipeline::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[path = "common/mod.rs"]
mod common;

use common::*;

fn encode(df: &polars::prelude::DataFrame) -> FeatureMatrix {
    let partition = partition_columns(df);
    FeatureAssembler::fit(df, &partition, "Churn", &[])
        .unwrap()
        .transform(df)
        .unwrap()
}

#[test]
fn test_depth_never_exceeds_bound() {
    let matrix = encode(&create_large_churn_dataframe(500, 6));

    for depth in [0, 1, 2, 5, 8] {
        let tree = DecisionTree::fit(&DecisionTreeParams::new().max_depth(depth), &matrix).unwrap();
        assert!(tree.depth() <= depth, "depth {} > bound {}", tree.depth(), depth);
        assert!(tree.num_nodes() <= (1 << (depth + 1)) - 1);
    }
}

#[test]
fn test_importances_sum_to_one_after_split() {
    let matrix = encode(&create_threshold_dataframe(400, 3));
    let tree = DecisionTree::fit(&DecisionTreeParams::new().max_depth(3), &matrix).unwrap();

    let importances = tree.feature_importances();
    assert_eq!(importances.len(), matrix.n_features());
    assert!(importances.iter().all(|&v| v >= 0.0));
    assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);

    // The threshold column carries the label
    let named = tree.named_importances();
    let (best, _) = named
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert_eq!(best, "score");
}

#[test]
fn test_scores_are_leaf_positive_rates() {
    let matrix = encode(&create_large_churn_dataframe(300, 3));
    let tree = DecisionTree::fit(&DecisionTreeParams::new().max_depth(4), &matrix).unwrap();

    for score in tree.predict_scores(&matrix) {
        assert!((0.0..=1.0).contains(&score));
    }
}

#[test]
fn test_fit_is_deterministic() {
    let matrix = encode(&create_large_churn_dataframe(400, 5));
    let params = DecisionTreeParams::new().max_depth(6);

    let a = DecisionTree::fit(&params, &matrix).unwrap();
    let b = DecisionTree::fit(&params, &matrix).unwrap();

    assert_eq!(a.to_debug_string(), b.to_debug_string());
    assert_eq!(a.predict_scores(&matrix), b.predict_scores(&matrix));
}

#[test]
fn test_many_distinct_values_use_binned_thresholds() {
    let mut rng = StdRng::seed_from_u64(9);
    let rows: Vec<Vec<f64>> = (0..2000).map(|_| vec![rng.gen::<f64>()]).collect();
    let labels: Vec<u8> = rows.iter().map(|r| u8::from(r[0] > 0.5)).collect();
    let matrix = FeatureMatrix::from_rows(vec!["x".into()], &rows, labels).unwrap();

    let tree = DecisionTree::fit(&DecisionTreeParams::new().max_depth(1).max_bins(8), &matrix).unwrap();

    match tree.root() {
        Node::Split { threshold, .. } => assert!((threshold - 0.5).abs() < 0.1),
        Node::Leaf { .. } => panic!("expected a split"),
    }
    let thresholds = find_candidate_thresholds(&rows.iter().map(|r| r[0]).collect::<Vec<_>>(), 8);
    assert!(thresholds.len() <= 7);
}

#[test]
fn test_debug_string_uses_feature_names() {
    let matrix = encode(&create_threshold_dataframe(200, 5));
    let tree = DecisionTree::fit(&DecisionTreeParams::new().max_depth(2), &matrix).unwrap();

    let dump = tree.to_debug_string();
    assert!(dump.starts_with("DecisionTree: depth="));
    assert!(dump.contains("If (score <="));
}
