//! Tests for AUC and the depth sweep

use churntree::pipeline::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_random_scores_on_balanced_labels_near_half() {
    let mut rng = StdRng::seed_from_u64(100);
    let n = 20_000;
    let scores: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    let labels: Vec<u8> = (0..n).map(|i| (i % 2) as u8).collect();

    let auc = area_under_roc(&scores, &labels);
    assert!((auc - 0.5).abs() < 0.02, "auc was {}", auc);
}

#[test]
fn test_auc_bounds() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..20 {
        let scores: Vec<f64> = (0..50).map(|_| (rng.gen::<f64>() * 5.0).floor()).collect();
        let labels: Vec<u8> = (0..50).map(|_| rng.gen_range(0..2)).collect();
        let auc = area_under_roc(&scores, &labels);
        assert!((0.0..=1.0).contains(&auc));
    }
}

#[test]
fn test_auc_matches_pair_counting() {
    let scores = [0.1, 0.4, 0.35, 0.8, 0.4, 0.9, 0.2];
    let labels = [0u8, 0, 1, 1, 1, 0, 1];

    let mut favorable = 0.0;
    let mut pairs = 0.0;
    for (i, &si) in scores.iter().enumerate() {
        for (j, &sj) in scores.iter().enumerate() {
            if labels[i] == 1 && labels[j] == 0 {
                pairs += 1.0;
                if si > sj {
                    favorable += 1.0;
                } else if si == sj {
                    favorable += 0.5;
                }
            }
        }
    }

    assert!((area_under_roc(&scores, &labels) - favorable / pairs).abs() < 1e-12);
}

#[test]
fn test_sweep_on_threshold_label_reaches_perfect_auc() {
    let df = create_threshold_dataframe(400, 21);
    let partition = partition_columns(&df);
    let matrix = FeatureAssembler::fit(&df, &partition, "Churn", &[])
        .unwrap()
        .transform(&df)
        .unwrap();
    let split = train_test_split(matrix.n_rows(), 0.7, 100).unwrap();
    let train = matrix.subset(&split.train);
    let test = matrix.subset(&split.test);

    let curve = evaluate_depths(&train, &test, &[2, 3, 4], &DecisionTreeParams::default()).unwrap();

    assert_eq!(curve.depths(), vec![2, 3, 4]);
    for point in &curve.points {
        assert!(point.train_auc > 0.99, "train auc {} at depth {}", point.train_auc, point.depth);
        assert!(point.test_auc > 0.95, "test auc {} at depth {}", point.test_auc, point.depth);
    }
}

#[test]
fn test_final_model_from_best_depth() {
    let df = create_threshold_dataframe(300, 4);
    let partition = partition_columns(&df);
    let matrix = FeatureAssembler::fit(&df, &partition, "Churn", &[])
        .unwrap()
        .transform(&df)
        .unwrap();
    let split = train_test_split(matrix.n_rows(), 0.7, 100).unwrap();
    let train = matrix.subset(&split.train);
    let test = matrix.subset(&split.test);

    let params = DecisionTreeParams::default();
    let curve = evaluate_depths(&train, &test, &[1, 2, 3], &params).unwrap();
    let best = curve.best().unwrap();

    let model = fit_final_model(&train, &test, &params.max_depth(best.depth)).unwrap();
    assert_eq!(model.test_auc, best.test_auc);
    assert_eq!(model.train_auc, best.train_auc);
}

#[test]
fn test_sweep_on_skewed_threshold_feature() {
    // Most rows sit on the minimum; the label is `x > 0`
    let rows: Vec<Vec<f64>> = std::iter::repeat(0.0)
        .take(1960)
        .chain((1..=40).map(|v| v as f64))
        .map(|x| vec![x])
        .collect();
    let labels: Vec<u8> = rows.iter().map(|r| u8::from(r[0] > 0.0)).collect();
    let matrix = FeatureMatrix::from_rows(vec!["x".to_string()], &rows, labels).unwrap();

    let split = train_test_split(matrix.n_rows(), 0.7, 100).unwrap();
    let train = matrix.subset(&split.train);
    let test = matrix.subset(&split.test);
    assert!(train.positive_count() > 0 && test.positive_count() > 0);

    let curve = evaluate_depths(&train, &test, &[2, 3, 4], &DecisionTreeParams::default()).unwrap();

    for point in &curve.points {
        assert_eq!(point.train_auc, 1.0, "train auc at depth {}", point.depth);
        assert_eq!(point.test_auc, 1.0, "test auc at depth {}", point.depth);
    }
}
